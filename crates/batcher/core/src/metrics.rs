//! Metric identifiers for the batcher core.

/// Container for the batcher metric identifiers.
#[derive(Debug)]
pub struct Metrics;

impl Metrics {
    /// Identifier for the count of L2 blocks accepted into the queue.
    pub const L2_BLOCKS_ADDED_TOTAL: &'static str = "batcher_l2_blocks_added_total";

    /// Identifier for the count of L2 blocks packed into a channel.
    pub const L2_BLOCKS_IN_CHANNEL_TOTAL: &'static str = "batcher_l2_blocks_in_channel_total";

    /// Identifier for the gauge of queued L2 blocks not yet in a channel.
    pub const L2_BLOCKS_PENDING: &'static str = "batcher_l2_blocks_pending";

    /// Identifier for the gauge of estimated DA bytes of pending blocks.
    pub const PENDING_DA_BYTES: &'static str = "batcher_pending_da_bytes";

    /// Identifier for the count of channels opened.
    pub const CHANNELS_OPENED_TOTAL: &'static str = "batcher_channels_opened_total";

    /// Identifier for the count of channels closed.
    pub const CHANNELS_CLOSED_TOTAL: &'static str = "batcher_channels_closed_total";

    /// Identifier for the count of batch transactions handed out.
    pub const BATCH_TXS_SUBMITTED_TOTAL: &'static str = "batcher_batch_txs_submitted_total";

    /// Identifier for the histogram of per-channel compression ratios.
    pub const CHANNEL_COMP_RATIO: &'static str = "batcher_channel_comp_ratio";

    /// Describes all batcher metrics and zeroes them so they are visible
    /// before first use.
    pub fn init() {
        Self::describe();
        Self::zero();
    }

    fn describe() {
        metrics::describe_counter!(
            Self::L2_BLOCKS_ADDED_TOTAL,
            metrics::Unit::Count,
            "Total number of L2 blocks accepted into the pending queue",
        );
        metrics::describe_counter!(
            Self::L2_BLOCKS_IN_CHANNEL_TOTAL,
            metrics::Unit::Count,
            "Total number of L2 blocks packed into a channel",
        );
        metrics::describe_gauge!(
            Self::L2_BLOCKS_PENDING,
            metrics::Unit::Count,
            "Number of queued L2 blocks not yet packed into a channel",
        );
        metrics::describe_gauge!(
            Self::PENDING_DA_BYTES,
            metrics::Unit::Bytes,
            "Estimated DA bytes of queued L2 blocks not yet packed into a channel",
        );
        metrics::describe_counter!(
            Self::CHANNELS_OPENED_TOTAL,
            metrics::Unit::Count,
            "Total number of channels opened",
        );
        metrics::describe_counter!(
            Self::CHANNELS_CLOSED_TOTAL,
            metrics::Unit::Count,
            "Total number of channels closed",
        );
        metrics::describe_counter!(
            Self::BATCH_TXS_SUBMITTED_TOTAL,
            metrics::Unit::Count,
            "Total number of batch transactions handed to the tx manager",
        );
        metrics::describe_histogram!(
            Self::CHANNEL_COMP_RATIO,
            "Compressed-to-input byte ratio of closed channels",
        );
    }

    fn zero() {
        metrics::counter!(Self::L2_BLOCKS_ADDED_TOTAL).increment(0);
        metrics::counter!(Self::L2_BLOCKS_IN_CHANNEL_TOTAL).increment(0);
        metrics::gauge!(Self::L2_BLOCKS_PENDING).set(0.0);
        metrics::gauge!(Self::PENDING_DA_BYTES).set(0.0);
        metrics::counter!(Self::CHANNELS_OPENED_TOTAL).increment(0);
        metrics::counter!(Self::CHANNELS_CLOSED_TOTAL).increment(0);
        metrics::counter!(Self::BATCH_TXS_SUBMITTED_TOTAL).increment(0);
    }
}
