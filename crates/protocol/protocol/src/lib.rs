#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/op-rs/hoist/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod block;
pub use block::{BlockInfo, L2Block, L2BlockInfo};

mod frame;
pub use frame::{ChannelId, DERIVATION_VERSION_0, FRAME_V0_OVERHEAD, Frame};

mod batch;
pub use batch::{BatchDecodingError, BatchType, SingleBatch};

mod sync;
pub use sync::SyncStatus;

mod rollup;
pub use rollup::{MAX_RLP_BYTES_PER_CHANNEL, RollupConfig};
