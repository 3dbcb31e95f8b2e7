//! Built-in scripts written into every HA bundle
//!
//! `cert-manager.sh` and `cacert.sh` are fixed. `install.sh` is a Tera
//! template filled per instance by [`crate::artifact::ArtifactWriter`].

/// cert-manager release the scripts install
pub const CERT_MANAGER_VERSION: &str = "v1.15.0";

/// Template name used when registering [`INSTALL_TEMPLATE`] with Tera
pub const INSTALL_TEMPLATE_NAME: &str = "install.sh";

/// Rancher install script.
///
/// Context: `bootstrap_password`, `image`, `chart`, `psp_enabled`. With PSP
/// disabled exactly one extra `--set` line is emitted.
pub const INSTALL_TEMPLATE: &str = r#"#!/bin/sh
export KUBECONFIG=kube_config_cluster.yml

helm repo update

kubectl create namespace cattle-system

helm install rancher rancher-latest/rancher \
  --namespace cattle-system \
  --set hostname="" \
  --set ingress.tls.source=letsEncrypt \
  --set letsEncrypt.email= \
  --set letsEncrypt.ingress.class=nginx \
  --set bootstrapPassword={{ bootstrap_password }} \
  --set rancherImageTag={{ image }} \
  --version {{ chart }} \
{% if not psp_enabled %}  --set global.cattle.psp.enabled=false \
{% endif %}  --set agentTLSMode=system-store \
  --set privateCA=true
"#;

/// Line added to `install.sh` when the global pod security policy is disabled
pub const PSP_DISABLED_LINE: &str = "  --set global.cattle.psp.enabled=false \\";

/// cert-manager installer
pub const CERT_MANAGER_SCRIPT: &str = r#"#!/bin/sh
export KUBECONFIG=kube_config_cluster.yml

kubectl apply -f https://github.com/cert-manager/cert-manager/releases/download/v1.15.0/cert-manager.crds.yaml

# Add the Jetstack Helm repository
helm repo add jetstack https://charts.jetstack.io

# Update your local Helm chart repository cache
helm repo update

# Install the cert-manager Helm chart
helm install cert-manager jetstack/cert-manager \
  --namespace cert-manager \
  --create-namespace \
  --version v1.15.0
"#;

/// Private CA secret for Rancher. Expects `./cacerts.pem` next to the script.
pub const CA_CERT_SCRIPT: &str = r#"#!/bin/sh
export KUBECONFIG=kube_config_cluster.yml

kubectl apply -f https://github.com/cert-manager/cert-manager/releases/download/v1.15.0/cert-manager.crds.yaml

kubectl -n cattle-system create secret generic tls-ca \
  --from-file=cacerts.pem=./cacerts.pem
"#;
