//! Checks on validator pool settings and delegation targets

use {
    stakeflow_common::{
        CommissionRange, CommissionRanges, CommissionRate, CommissionRates, OpenStatus, PoolInfo,
    },
    thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolSettingsError {
    #[error("{name} commission {rate} is outside the allowed range {min} to {max}")]
    CommissionOutOfRange {
        name: &'static str,
        rate: CommissionRate,
        min: CommissionRate,
        max: CommissionRate,
    },

    #[error("metadata URL is {length} bytes, the limit is {limit}")]
    MetadataUrlTooLong { length: usize, limit: usize },

    #[error("validator keys are missing or malformed")]
    MissingKeys,

    #[error("validator pool {0} is not accepting new delegators")]
    PoolClosed(u64),
}

pub fn check_commissions(rates: &CommissionRates, ranges: &CommissionRanges) -> Result<(), PoolSettingsError> {
    let checks: [(&'static str, CommissionRate, &CommissionRange); 3] = [
        ("transaction fee", rates.transaction, &ranges.transaction),
        ("block reward", rates.baking, &ranges.baking),
        ("finalization reward", rates.finalization, &ranges.finalization),
    ];

    for (name, rate, range) in checks {
        if !range.contains(rate) {
            return Err(PoolSettingsError::CommissionOutOfRange {
                name,
                rate,
                min: range.min,
                max: range.max,
            });
        }
    }
    Ok(())
}

pub fn check_metadata_url(url: &str, limit: usize) -> Result<(), PoolSettingsError> {
    if url.len() > limit {
        return Err(PoolSettingsError::MetadataUrlTooLong {
            length: url.len(),
            limit,
        });
    }
    Ok(())
}

/// A delegator may join a pool only while it is open; existing delegators may stay in a pool closed for new ones.
pub fn check_pool_open(pool: &PoolInfo, joining: bool) -> Result<(), PoolSettingsError> {
    let accepted = match pool.open_status {
        OpenStatus::OpenForAll => true,
        OpenStatus::ClosedForNew => !joining,
        OpenStatus::ClosedForAll => false,
    };
    if accepted {
        Ok(())
    } else {
        Err(PoolSettingsError::PoolClosed(pool.validator_id))
    }
}
