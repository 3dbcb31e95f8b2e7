use async_trait::async_trait;
use hainfra_config::{ConfigBundle, HaSettings, TerraformSettings};
use hainfra_terraform::{OutputSet, Provisioner, ProvisioningRequest, TerraformError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn module_dir(&self) -> PathBuf {
        let dir = self.root.path().join("modules").join("aws");
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Validated config writing bundles into the project root
    #[allow(dead_code)]
    pub fn config(&self, total_has: u32) -> ConfigBundle {
        ConfigBundle {
            total_has,
            pem_path: "/keys/ha.pem".to_string(),
            bootstrap_password: "letmein".to_string(),
            ha: HaSettings {
                image: "v2.9.2".to_string(),
                chart: "2.9.2".to_string(),
                psp_enabled: true,
            },
            ha_overrides: BTreeMap::new(),
            terraform: TerraformSettings {
                dir: self.module_dir(),
                ..TerraformSettings::default()
            },
            tf_vars: BTreeMap::from([("aws_prefix".to_string(), "ci".to_string())]),
            output_dir: self.path(),
        }
    }

    #[allow(dead_code)]
    pub fn write_config(&self, total_has: u32) -> PathBuf {
        let content = format!(
            r#"total_has: {}
output_dir: {}
local:
  pem_path: /keys/ha.pem
rancher:
  bootstrap_password: letmein
ha_config:
  image: v2.9.2
  chart: 2.9.2
terraform:
  dir: {}
tf_vars:
  aws_prefix: ci
"#,
            total_has,
            self.path().display(),
            self.module_dir().display()
        );
        let path = self.root.path().join("tool-config.yml");
        fs::write(&path, content).unwrap();
        path
    }

    #[allow(dead_code)]
    pub fn write_outputs(&self, outputs: &OutputSet) -> PathBuf {
        let path = self.root.path().join("outputs.json");
        fs::write(&path, serde_json::to_string_pretty(outputs).unwrap()).unwrap();
        path
    }

    pub fn bundle_dir(&self, index: u32) -> PathBuf {
        hainfra::instance_dir(self.root.path(), index)
    }

    #[allow(dead_code)]
    pub fn read(&self, index: u32, file: &str) -> String {
        fs::read_to_string(self.bundle_dir(index).join(file)).unwrap()
    }
}

/// A complete output set. Instance 1 uses 10.0.0.x public and 10.0.1.x
/// private addresses, instance 2 uses 10.0.2.x and 10.0.3.x, and so on.
pub fn outputs(count: u32) -> OutputSet {
    let mut set = OutputSet::new();
    for i in 1..=count {
        for n in 1..=3 {
            set.insert(
                format!("ha_{}_server{}_ip", i, n),
                format!("10.0.{}.{}", (i - 1) * 2, n),
            );
            set.insert(
                format!("ha_{}_server{}_private_ip", i, n),
                format!("10.0.{}.{}", (i - 1) * 2 + 1, n),
            );
        }
        set.insert(format!("ha_{}_aws_lb", i), format!("lb{}.example.com", i));
    }
    set
}

#[allow(dead_code)]
pub fn is_complete_bundle(dir: &Path) -> bool {
    hainfra::artifact::BUNDLE_FILES
        .iter()
        .all(|name| dir.join(name).is_file())
}

/// In-memory provisioner recording every call
#[allow(dead_code)]
pub struct FakeProvisioner {
    outputs: OutputSet,
    fail_apply: bool,
    fail_destroy: bool,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeProvisioner {
    pub fn new(outputs: OutputSet) -> Self {
        Self {
            outputs,
            fail_apply: false,
            fail_destroy: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_apply() -> Self {
        Self {
            fail_apply: true,
            ..Self::new(OutputSet::new())
        }
    }

    pub fn failing_destroy() -> Self {
        Self {
            fail_destroy: true,
            ..Self::new(OutputSet::new())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[allow(dead_code)]
fn command_failed(command: &str) -> TerraformError {
    TerraformError::CommandFailed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        stderr: "Error: UnauthorizedOperation".to_string(),
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    fn name(&self) -> &str {
        "fake"
    }

    async fn apply(&self, request: &ProvisioningRequest) -> hainfra_terraform::Result<OutputSet> {
        self.record(format!("apply {}", request.count));
        if self.fail_apply {
            return Err(command_failed("apply"));
        }
        Ok(self.outputs.clone())
    }

    async fn outputs(&self) -> hainfra_terraform::Result<OutputSet> {
        self.record("outputs".to_string());
        Ok(self.outputs.clone())
    }

    async fn destroy(&self, request: &ProvisioningRequest) -> hainfra_terraform::Result<()> {
        self.record(format!("destroy {}", request.count));
        if self.fail_destroy {
            return Err(command_failed("destroy"));
        }
        Ok(())
    }
}
