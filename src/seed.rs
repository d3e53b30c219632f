// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use tracing::info;

use crate::error::StoreError;
use crate::models::NewChannel;
use crate::store::SessionStore;

struct SeedChannel {
    channel_id: &'static str,
    name: &'static str,
    description: &'static str,
    thumbnail_url: &'static str,
    banner_url: &'static str,
    category: &'static str,
}

const SEED_CHANNELS: &[SeedChannel] = &[
    SeedChannel {
        channel_id: "UC6Bkb7sGltQ8BNgwxw9B2ow",
        name: "Beast Philanthropy",
        description: "MrBeast's charity focused on alleviating hunger and helping communities in need.",
        thumbnail_url: "https://yt3.googleusercontent.com/ytc/APkrFKY455xp_gvuLt0o2-5I0-tZKWurbrtCgkbBp0Mq=s176-c-k-c0x00ffffff-no-rj",
        banner_url: "https://i.ytimg.com/vi/ylD6sQHfRwI/maxresdefault.jpg",
        category: "Humanitarian",
    },
    SeedChannel {
        channel_id: "UCX6OQ3DkcsbYNE6H8uQQuVA",
        name: "MrBeast",
        description: "Known for massive philanthropy projects and charitable giveaways to help those in need.",
        thumbnail_url: "https://yt3.googleusercontent.com/ytc/APkrFKZWeMCsx4Q9e_Hm6T4hpOUoPhFR7UfxBFxBPwxJ=s176-c-k-c0x00ffffff-no-rj",
        banner_url: "https://i.ytimg.com/vi/n2RUGifq7bE/maxresdefault.jpg",
        category: "Humanitarian",
    },
    SeedChannel {
        channel_id: "UCRijo3ddMTht_IHyNSNXpNQ",
        name: "TeamTrees",
        description: "Environmental initiative to plant 20 million trees around the globe to combat deforestation.",
        thumbnail_url: "https://yt3.googleusercontent.com/ytc/APkrFKafTTV3Qc9MfAxSWuGVh_Ud5LK-uIrK1ozgrLZU=s176-c-k-c0x00ffffff-no-rj",
        banner_url: "https://i.ytimg.com/vi/U7nJBFjKqAY/maxresdefault.jpg",
        category: "Environmental",
    },
    SeedChannel {
        channel_id: "UCfALHWisCfxbD0CRxTUYYGQ",
        name: "World Food Programme",
        description: "The world's largest humanitarian organization saving lives in emergencies and building prosperity.",
        thumbnail_url: "https://yt3.googleusercontent.com/ytc/APkrFKbwAjMWw-NCDNO8kUkq8S8mH64VJvlTKDYwHMcq=s176-c-k-c0x00ffffff-no-rj",
        banner_url: "https://i.ytimg.com/vi/BcbgaW1RZQQ/maxresdefault.jpg",
        category: "Humanitarian",
    },
];

impl From<&SeedChannel> for NewChannel {
    fn from(seed: &SeedChannel) -> Self {
        NewChannel {
            channel_id: seed.channel_id.to_string(),
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            thumbnail_url: Some(seed.thumbnail_url.to_string()),
            banner_url: Some(seed.banner_url.to_string()),
            category: Some(seed.category.to_string()),
            is_verified: true,
        }
    }
}

/// Insert the built-in verified channels that are not stored yet.
///
/// Existing rows are left alone so a changed verification flag survives restarts.
pub async fn seed_channels(store: &dyn SessionStore) -> Result<usize, StoreError> {
    for seed in SEED_CHANNELS {
        store.ensure_channel(seed.into()).await?;
    }
    info!("Seeded {} verified channels", SEED_CHANNELS.len());
    Ok(SEED_CHANNELS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn seeding_twice_keeps_four_verified_channels() {
        let store = MemoryStore::new();
        seed_channels(&store).await.unwrap();
        seed_channels(&store).await.unwrap();

        let channels = store.verified_channels().await.unwrap();
        assert_eq!(channels.len(), 4);
        assert!(channels.iter().any(|c| c.name == "TeamTrees"));
    }

    #[tokio::test]
    async fn reseeding_keeps_a_changed_verification_flag() {
        let store = MemoryStore::new();
        seed_channels(&store).await.unwrap();
        store
            .set_channel_verified("UCX6OQ3DkcsbYNE6H8uQQuVA", false)
            .await
            .unwrap();

        seed_channels(&store).await.unwrap();

        let channel = store
            .get_channel("UCX6OQ3DkcsbYNE6H8uQQuVA")
            .await
            .unwrap()
            .unwrap();
        assert!(!channel.is_verified);
        assert_eq!(channel.name, "MrBeast");
        assert_eq!(store.verified_channels().await.unwrap().len(), 3);
    }
}
