//! Typed access to the per-instance entries of an [`OutputSet`]

use crate::address::is_valid_ip;
use crate::error::{HaError, Result};
use hainfra_terraform::OutputSet;
use std::fmt;

/// One of the seven values the Terraform module exports per HA instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputField {
    Server1Ip,
    Server2Ip,
    Server3Ip,
    Server1PrivateIp,
    Server2PrivateIp,
    Server3PrivateIp,
    AwsLb,
}

impl OutputField {
    pub const ALL: [OutputField; 7] = [
        OutputField::Server1Ip,
        OutputField::Server2Ip,
        OutputField::Server3Ip,
        OutputField::Server1PrivateIp,
        OutputField::Server2PrivateIp,
        OutputField::Server3PrivateIp,
        OutputField::AwsLb,
    ];

    /// Fields that must hold IP literals
    pub const ADDRESSES: [OutputField; 6] = [
        OutputField::Server1Ip,
        OutputField::Server2Ip,
        OutputField::Server3Ip,
        OutputField::Server1PrivateIp,
        OutputField::Server2PrivateIp,
        OutputField::Server3PrivateIp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputField::Server1Ip => "server1_ip",
            OutputField::Server2Ip => "server2_ip",
            OutputField::Server3Ip => "server3_ip",
            OutputField::Server1PrivateIp => "server1_private_ip",
            OutputField::Server2PrivateIp => "server2_private_ip",
            OutputField::Server3PrivateIp => "server3_private_ip",
            OutputField::AwsLb => "aws_lb",
        }
    }

    /// Output key for this field of instance `index`, e.g. `ha_2_server3_ip`
    pub fn key(&self, index: u32) -> String {
        format!("ha_{}_{}", index, self.as_str())
    }
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public and private address of one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddresses {
    pub public: String,
    pub private: String,
}

/// Addresses of one HA instance. Node `i` pairs `server{i}_ip` with `server{i}_private_ip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceAddresses {
    pub index: u32,
    pub nodes: [NodeAddresses; 3],
    pub load_balancer: String,
}

impl InstanceAddresses {
    /// Pull instance `index` out of the output set.
    ///
    /// A key that is absent or holds only whitespace is reported as missing.
    pub fn from_outputs(index: u32, outputs: &OutputSet) -> Result<Self> {
        let get = |field: OutputField| -> Result<String> {
            let key = field.key(index);
            match outputs.get(&key) {
                Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
                _ => Err(HaError::MissingOutput {
                    instance: index,
                    field,
                    key,
                }),
            }
        };

        let node = |public: OutputField, private: OutputField| -> Result<NodeAddresses> {
            Ok(NodeAddresses {
                public: get(public)?,
                private: get(private)?,
            })
        };

        Ok(Self {
            index,
            nodes: [
                node(OutputField::Server1Ip, OutputField::Server1PrivateIp)?,
                node(OutputField::Server2Ip, OutputField::Server2PrivateIp)?,
                node(OutputField::Server3Ip, OutputField::Server3PrivateIp)?,
            ],
            load_balancer: get(OutputField::AwsLb)?,
        })
    }

    pub fn field(&self, field: OutputField) -> &str {
        match field {
            OutputField::Server1Ip => &self.nodes[0].public,
            OutputField::Server2Ip => &self.nodes[1].public,
            OutputField::Server3Ip => &self.nodes[2].public,
            OutputField::Server1PrivateIp => &self.nodes[0].private,
            OutputField::Server2PrivateIp => &self.nodes[1].private,
            OutputField::Server3PrivateIp => &self.nodes[2].private,
            OutputField::AwsLb => &self.load_balancer,
        }
    }

    /// Every node address must be an IP literal. The load balancer is a DNS name and is not checked.
    pub fn validate(&self) -> Result<()> {
        for field in OutputField::ADDRESSES {
            let value = self.field(field);
            if !is_valid_ip(value) {
                return Err(HaError::InvalidAddress {
                    instance: self.index,
                    field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
