#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hoist/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::{ChannelConfig, ChannelConfigProvider};

mod errors;
pub use errors::{ChannelBuilderError, ChannelFullError, ChannelManagerError};

mod txdata;
pub use txdata::{TxData, TxId};

mod channel_out;
pub use channel_out::{ChannelOut, ChannelOutFactory, CompChannelOut, CompChannelOutFactory};

mod builder;
pub use builder::ChannelBuilder;

mod channel;
pub use channel::Channel;

mod manager;
pub use manager::{ChannelManager, ManagerStatus};

mod metrics;
pub use metrics::Metrics;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
