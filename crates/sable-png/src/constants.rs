/// The eight signature bytes every PNG file starts with,
/// `89 50 4E 47 0D 0A 1A 0A`.
pub const PNG_SIGNATURE: u64 = 0x8950_4E47_0D0A_1A0A;

/// Preferred size of a single IDAT chunk's payload.
pub const IDAT_CHUNK_SIZE: usize = 8192;
