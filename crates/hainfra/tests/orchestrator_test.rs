mod common;

use common::{FakeProvisioner, TestProject, is_complete_bundle, outputs};
use hainfra::artifact::{CLUSTER_FILE, INSTALL_FILE, LB_FILE};
use hainfra::{HaError, Orchestrator, OutputField};
use hainfra_terraform::{OutputSet, TerraformError};

fn without(set: &OutputSet, key: &str) -> OutputSet {
    set.iter()
        .filter(|(k, _)| k.as_str() != key)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// two instances get two complete bundles from a single apply
#[tokio::test]
async fn test_two_instances_get_full_bundles() {
    let project = TestProject::new();
    let config = project.config(2);
    let provisioner = FakeProvisioner::new(outputs(2));
    let orchestrator = Orchestrator::new(&config).unwrap();

    let report = orchestrator.provision(&provisioner).await.unwrap();
    let bundles = report.into_result().unwrap();

    assert_eq!(bundles.len(), 2);
    assert!(is_complete_bundle(&project.bundle_dir(1)));
    assert!(is_complete_bundle(&project.bundle_dir(2)));
    assert_eq!(provisioner.calls(), ["apply 2"]);

    let cluster: serde_yaml::Value =
        serde_yaml::from_str(&project.read(1, CLUSTER_FILE)).unwrap();
    let first = &cluster["nodes"][0];
    assert_eq!(first["address"].as_str(), Some("10.0.0.1"));
    assert_eq!(first["internal_address"].as_str(), Some("10.0.1.1"));
    assert_eq!(cluster["ssh_key_path"].as_str(), Some("/keys/ha.pem"));

    assert_eq!(project.read(1, LB_FILE), "lb1.example.com");
    assert_eq!(project.read(2, LB_FILE), "lb2.example.com");
    assert!(project.read(2, INSTALL_FILE).contains("--set bootstrapPassword=letmein"));
}

/// a missing output key is reported with instance and field
#[tokio::test]
async fn test_missing_output_names_instance_and_field() {
    let project = TestProject::new();
    let config = project.config(2);
    let provisioner = FakeProvisioner::new(without(&outputs(2), "ha_2_server3_ip"));
    let orchestrator = Orchestrator::new(&config).unwrap();

    let report = orchestrator.provision(&provisioner).await.unwrap();

    assert_eq!(report.bundles.len(), 1);
    assert!(is_complete_bundle(&project.bundle_dir(1)));
    assert_eq!(report.failures.len(), 1);
    match &report.failures[0].error {
        HaError::MissingOutput {
            instance,
            field,
            key,
        } => {
            assert_eq!(*instance, 2);
            assert_eq!(*field, OutputField::Server3Ip);
            assert_eq!(key, "ha_2_server3_ip");
        }
        other => panic!("expected MissingOutput, got {:?}", other),
    }

    let message = report.into_result().unwrap_err().to_string();
    assert!(message.contains("1 of 2"));
    assert!(message.contains("ha_2_server3_ip"));
}

/// an invalid address leaves no files for that instance
#[tokio::test]
async fn test_invalid_address_writes_nothing_for_that_instance() {
    let project = TestProject::new();
    let config = project.config(1);
    let mut set = outputs(1);
    set.insert("ha_1_server1_ip", "999.999.999.999");
    let provisioner = FakeProvisioner::new(set);
    let orchestrator = Orchestrator::new(&config).unwrap();

    let report = orchestrator.provision(&provisioner).await.unwrap();

    assert!(report.bundles.is_empty());
    match &report.failures[0].error {
        HaError::InvalidAddress {
            instance,
            field,
            value,
        } => {
            assert_eq!(*instance, 1);
            assert_eq!(*field, OutputField::Server1Ip);
            assert_eq!(value, "999.999.999.999");
        }
        other => panic!("expected InvalidAddress, got {:?}", other),
    }
    assert!(!project.bundle_dir(1).exists());
}

/// an empty output set aborts the run
#[tokio::test]
async fn test_empty_output_is_fatal() {
    let project = TestProject::new();
    let config = project.config(2);
    let provisioner = FakeProvisioner::new(OutputSet::new());
    let orchestrator = Orchestrator::new(&config).unwrap();

    let err = orchestrator.provision(&provisioner).await.unwrap_err();

    assert!(matches!(err, HaError::EmptyOutput));
    assert!(!project.bundle_dir(1).exists());
}

/// a failed apply aborts the run
#[tokio::test]
async fn test_provisioning_failure_is_fatal() {
    let project = TestProject::new();
    let config = project.config(2);
    let provisioner = FakeProvisioner::failing_apply();
    let orchestrator = Orchestrator::new(&config).unwrap();

    let err = orchestrator.provision(&provisioner).await.unwrap_err();

    match err {
        HaError::Terraform(TerraformError::CommandFailed { command, .. }) => {
            assert_eq!(command, "apply")
        }
        other => panic!("expected Terraform error, got {:?}", other),
    }
    assert!(!project.bundle_dir(1).exists());
}

/// a zero instance count is rejected before apply
#[tokio::test]
async fn test_zero_count_is_rejected_before_apply() {
    let project = TestProject::new();
    let config = project.config(0);
    let provisioner = FakeProvisioner::new(outputs(1));
    let orchestrator = Orchestrator::new(&config).unwrap();

    let err = orchestrator.provision(&provisioner).await.unwrap_err();

    assert!(matches!(err, HaError::InvalidCount(0)));
    assert!(provisioner.calls().is_empty());
}

/// a second run overwrites existing bundle files
#[tokio::test]
async fn test_rerun_overwrites_bundles() {
    let project = TestProject::new();
    let config = project.config(1);
    let orchestrator = Orchestrator::new(&config).unwrap();

    orchestrator
        .provision(&FakeProvisioner::new(outputs(1)))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    let mut moved = outputs(1);
    moved.insert("ha_1_aws_lb", "lb-new.example.com");
    orchestrator
        .provision(&FakeProvisioner::new(moved))
        .await
        .unwrap()
        .into_result()
        .unwrap();

    assert_eq!(project.read(1, LB_FILE), "lb-new.example.com");
}

/// teardown destroys first, then removes bundles and state
#[tokio::test]
async fn test_teardown_destroys_then_cleans() {
    let project = TestProject::new();
    let config = project.config(2);
    let provisioner = FakeProvisioner::new(outputs(2));
    let orchestrator = Orchestrator::new(&config).unwrap();
    orchestrator
        .provision(&provisioner)
        .await
        .unwrap()
        .into_result()
        .unwrap();
    std::fs::write(config.terraform.dir.join("terraform.tfstate"), "{}").unwrap();

    let report = orchestrator.teardown(&provisioner).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(provisioner.calls(), ["apply 2", "destroy 2"]);
    assert!(!project.bundle_dir(1).exists());
    assert!(!project.bundle_dir(2).exists());
    assert!(!config.terraform.dir.join("terraform.tfstate").exists());
}

/// a failed destroy leaves bundles and state in place
#[tokio::test]
async fn test_failed_destroy_keeps_local_state() {
    let project = TestProject::new();
    let config = project.config(1);
    Orchestrator::new(&config)
        .unwrap()
        .materialize(&outputs(1))
        .into_result()
        .unwrap();
    let state = config.terraform.dir.join("terraform.tfstate");
    std::fs::write(&state, "{}").unwrap();

    let provisioner = FakeProvisioner::failing_destroy();
    let err = Orchestrator::new(&config)
        .unwrap()
        .teardown(&provisioner)
        .await
        .unwrap_err();

    assert!(matches!(err, HaError::Terraform(_)));
    assert!(state.exists());
    assert!(is_complete_bundle(&project.bundle_dir(1)));
}
