use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x8b5ad4a0c7d8e9f1;

/// Stable per-frame fingerprint used by the rendered-frame cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FrameFingerprint {
    pub(crate) hi: u64,
    pub(crate) lo: u64,
}

/// Fingerprint a composed SVG document plus the post-processing applied to its raster.
pub(crate) fn fingerprint_svg(svg: &str, invert_colors: bool) -> FrameFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&[u8::from(invert_colors)]);
    h.update(&(svg.len() as u64).to_le_bytes());
    h.update(svg.as_bytes());
    let v = h.digest128();
    FrameFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}
