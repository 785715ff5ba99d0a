//! Land-area consistency invariant.

use agrobase_core::{DomainError, DomainResult};
use rust_decimal::Decimal;

/// Check that `arable + vegetation` does not exceed `total`.
///
/// Comparison is exact decimal arithmetic, no tolerance. The caller decides
/// which values to compare; on partial updates that means the merged
/// post-update trio.
pub fn check_areas(total: Decimal, arable: Decimal, vegetation: Decimal) -> DomainResult<()> {
    if arable + vegetation > total {
        return Err(DomainError::area_exceeded(
            "the sum of arable and vegetation areas must not exceed the total farm area",
        ));
    }
    Ok(())
}
