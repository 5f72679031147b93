pub mod manifest;

pub use manifest::{
    forge_subversions, modpack_names, vanilla_release_ids, ForgePromotions, VersionManifest,
};
