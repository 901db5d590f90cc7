use async_trait::async_trait;

/// Repository trait for site-wide settings reads.
///
/// The core only ever reads one value through this trait: the canonical
/// test-drive fee, fetched once at booking-creation time and snapshotted into
/// the booking. Entity repositories (vehicles, bookings) live next to their
/// entity types so the dependency graph stays acyclic.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current test-drive fee in whole naira, or `None` when the setting row
    /// is absent and the caller should fall back to the documented default.
    async fn test_drive_fee(
        &self,
    ) -> Result<Option<i64>, Box<dyn std::error::Error + Send + Sync>>;
}
