//! Per-instance artifact bundle: cluster descriptor, scripts and load balancer file

use crate::error::{HaError, Result};
use crate::outputs::InstanceAddresses;
use crate::scripts::{
    CA_CERT_SCRIPT, CERT_MANAGER_SCRIPT, INSTALL_TEMPLATE, INSTALL_TEMPLATE_NAME,
};
use hainfra_config::HaSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

pub const CLUSTER_FILE: &str = "cluster.yml";
pub const INSTALL_FILE: &str = "install.sh";
pub const CERT_MANAGER_FILE: &str = "cert-manager.sh";
pub const CA_CERT_FILE: &str = "cacert.sh";
pub const LB_FILE: &str = "aws_lb.txt";

/// Every file a bundle consists of, in the order they are written
pub const BUNDLE_FILES: [&str; 5] = [
    CLUSTER_FILE,
    INSTALL_FILE,
    CERT_MANAGER_FILE,
    CA_CERT_FILE,
    LB_FILE,
];

/// Login user on the node images
pub const NODE_USER: &str = "ubuntu";

/// Directory holding the bundle of instance `index`
pub fn instance_dir(output_dir: &Path, index: u32) -> PathBuf {
    output_dir.join(format!("high-availability-{}", index))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Etcd,
    Controlplane,
    Worker,
}

/// All nodes of an HA cluster carry every role
pub const ALL_ROLES: [NodeRole; 3] = [NodeRole::Etcd, NodeRole::Controlplane, NodeRole::Worker];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub address: String,
    pub internal_address: String,
    pub user: String,
    pub role: Vec<NodeRole>,
}

/// Node list consumed by the cluster bootstrapper (`cluster.yml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub ssh_key_path: String,
    pub nodes: Vec<ClusterNode>,
}

impl ClusterDescriptor {
    pub fn new(ssh_key_path: impl Into<String>, addresses: &InstanceAddresses) -> Self {
        Self {
            ssh_key_path: ssh_key_path.into(),
            nodes: addresses
                .nodes
                .iter()
                .map(|node| ClusterNode {
                    address: node.public.clone(),
                    internal_address: node.private.clone(),
                    user: NODE_USER.to_string(),
                    role: ALL_ROLES.to_vec(),
                })
                .collect(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| HaError::Render {
            artifact: CLUSTER_FILE,
            message: e.to_string(),
        })
    }
}

/// Files written for one HA instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceBundle {
    pub index: u32,
    pub dir: PathBuf,
    pub load_balancer: String,
}

impl InstanceBundle {
    pub fn files(&self) -> Vec<PathBuf> {
        BUNDLE_FILES.iter().map(|name| self.dir.join(name)).collect()
    }
}

/// Renders and writes bundle files. Each write replaces the whole file.
pub struct ArtifactWriter {
    tera: Tera,
}

impl ArtifactWriter {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(INSTALL_TEMPLATE_NAME, INSTALL_TEMPLATE)
            .map_err(|e| HaError::Render {
                artifact: INSTALL_FILE,
                message: e.to_string(),
            })?;
        Ok(Self { tera })
    }

    /// Render `install.sh` for the given chart settings
    pub fn render_install_script(
        &self,
        bootstrap_password: &str,
        settings: &HaSettings,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("bootstrap_password", bootstrap_password);
        context.insert("image", &settings.image);
        context.insert("chart", &settings.chart);
        context.insert("psp_enabled", &settings.psp_enabled);

        self.tera
            .render(INSTALL_TEMPLATE_NAME, &context)
            .map_err(|e| HaError::Render {
                artifact: INSTALL_FILE,
                message: e.to_string(),
            })
    }

    /// Create the bundle directory if it is not there yet
    pub fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|source| HaError::ArtifactWrite {
                path: dir.to_path_buf(),
                source,
            })?;
            tracing::debug!("Created bundle directory: {}", dir.display());
        }
        Ok(())
    }

    pub fn write_cluster_descriptor(
        &self,
        dir: &Path,
        descriptor: &ClusterDescriptor,
    ) -> Result<PathBuf> {
        write_file(&dir.join(CLUSTER_FILE), &descriptor.to_yaml()?)
    }

    pub fn write_install_script(
        &self,
        dir: &Path,
        bootstrap_password: &str,
        settings: &HaSettings,
    ) -> Result<PathBuf> {
        let script = self.render_install_script(bootstrap_password, settings)?;
        write_file(&dir.join(INSTALL_FILE), &script)
    }

    pub fn write_cert_manager_script(&self, dir: &Path) -> Result<PathBuf> {
        write_file(&dir.join(CERT_MANAGER_FILE), CERT_MANAGER_SCRIPT)
    }

    pub fn write_ca_cert_script(&self, dir: &Path) -> Result<PathBuf> {
        write_file(&dir.join(CA_CERT_FILE), CA_CERT_SCRIPT)
    }

    /// The load balancer DNS name, verbatim
    pub fn write_lb_file(&self, dir: &Path, load_balancer: &str) -> Result<PathBuf> {
        write_file(&dir.join(LB_FILE), load_balancer)
    }

    /// Write all five files for one instance.
    ///
    /// Stops at the first failing file; files already written stay on disk.
    pub fn write_bundle(
        &self,
        dir: &Path,
        addresses: &InstanceAddresses,
        ssh_key_path: &str,
        bootstrap_password: &str,
        settings: &HaSettings,
    ) -> Result<InstanceBundle> {
        self.ensure_dir(dir)?;

        let descriptor = ClusterDescriptor::new(ssh_key_path, addresses);
        self.write_cluster_descriptor(dir, &descriptor)?;
        self.write_install_script(dir, bootstrap_password, settings)?;
        self.write_cert_manager_script(dir)?;
        self.write_ca_cert_script(dir)?;
        self.write_lb_file(dir, &addresses.load_balancer)?;

        Ok(InstanceBundle {
            index: addresses.index,
            dir: dir.to_path_buf(),
            load_balancer: addresses.load_balancer.clone(),
        })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<PathBuf> {
    fs::write(path, contents).map_err(|source| HaError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}
