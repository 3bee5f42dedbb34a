//! Ball image lookup

use converge_core::AssetRef;

/// Maps a ball's asset index to the image it shows
pub trait AssetSource {
    fn asset_for(&self, index: u32) -> AssetRef;
}

impl<F> AssetSource for F
where
    F: Fn(u32) -> AssetRef,
{
    fn asset_for(&self, index: u32) -> AssetRef {
        self(index)
    }
}

/// Stock artwork: numbered images for the left balls, one shared image for
/// every right ball.
#[derive(Clone, Debug)]
pub struct BundledAssets {
    pub base: String,
    /// Indices from this value up use the shared right-side image
    pub first_right_index: u32,
}

impl Default for BundledAssets {
    fn default() -> Self {
        Self {
            base: "/images".to_string(),
            first_right_index: 6,
        }
    }
}

impl AssetSource for BundledAssets {
    fn asset_for(&self, index: u32) -> AssetRef {
        if index >= self.first_right_index {
            AssetRef::new(format!("{}/RL.svg", self.base))
        } else {
            AssetRef::new(format!("{}/B{index}.svg", self.base))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_assets() {
        let assets = BundledAssets::default();
        assert_eq!(assets.asset_for(3).as_str(), "/images/B3.svg");
        assert_eq!(assets.asset_for(6).as_str(), "/images/RL.svg");
        assert_eq!(assets.asset_for(10).as_str(), "/images/RL.svg");
    }

    #[test]
    fn test_closure_source() {
        let source = |index: u32| AssetRef::new(format!("cdn://ball/{index}"));
        assert_eq!(source.asset_for(7).as_str(), "cdn://ball/7");
    }
}
