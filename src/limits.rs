/// Bounds on how much of a stream detection may consume.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Limits {
    /// Largest stream offset any parser may read up to. JPEG files with big
    /// metadata segments and TIFF files with a trailing directory are the
    /// usual reasons to hit it.
    pub max_scan_bytes: Option<u64>,
}

impl Limits {
    pub fn with_max_scan_bytes(mut self, n: u64) -> Limits {
        self.max_scan_bytes = Some(n);
        self
    }
}
