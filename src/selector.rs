//! Misses-weighted random choice of a quiz word.
//!
//! Each saved word owns a half-open slot of width `1 + misses`, laid out in
//! insertion order. A uniform draw over the whole slot space picks the word
//! whose slot contains it, so a word missed often comes up more often while a
//! word never missed still keeps a slot of width 1.

use crate::Vault;
use crate::error::{Result, VaultError};
use crate::models::WordEntry;
use log::debug;
use rand::Rng;

/// Index of the slot containing `draw`, scanning slots of width `1 + misses` in order.
///
/// `None` if `draw` lies past the last slot.
pub fn locate_slot<I>(draw: u64, misses: I) -> Option<usize>
where
    I: IntoIterator<Item = u32>,
{
    let mut running: u64 = 0;
    for (i, m) in misses.into_iter().enumerate() {
        running += 1 + u64::from(m);
        if draw < running {
            return Some(i);
        }
    }
    None
}

/// Draws a saved word with probability proportional to `1 + misses`.
///
/// The slot space is `count + total_misses`, both read from the store in the
/// same scan, so misses recorded by other sessions are always accounted for.
pub fn select_weighted<R>(vault: &Vault, rng: &mut R) -> Result<WordEntry>
where
    R: Rng,
{
    let counts = vault.miss_counts()?;
    if counts.is_empty() {
        return Err(VaultError::EmptyStore);
    }

    let total_misses: u64 = counts.iter().map(|&(_, m)| u64::from(m)).sum();
    let space = counts.len() as u64 + total_misses;
    let draw = rng.random_range(0..space);
    let index = locate_slot(draw, counts.iter().map(|&(_, m)| m)).ok_or_else(|| {
        VaultError::Internal(format!("draw {} outside slot space {}", draw, space))
    })?;
    let ordinal = counts[index].0;
    debug!("select_weighted: draw={} of {}, ordinal={}", draw, space, ordinal);

    vault
        .lookup_by_ordinal(ordinal)?
        .ok_or(VaultError::OrdinalNotFound(ordinal))
}
