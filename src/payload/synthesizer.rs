use chrono::Utc;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use uuid::{Builder, Uuid};

use super::catalog::{LOCALES, PAGES, REFERRERS, USER_AGENTS};
use crate::config::PayloadConfig;
use crate::domain::{
    EventKind, Purchase, SimulatedUser, TrackingEvent, Viewport, VIEWPORT_HEIGHT_MAX,
    VIEWPORT_HEIGHT_MIN, VIEWPORT_WIDTH_MAX, VIEWPORT_WIDTH_MIN,
};

/// Draws simulated users and tracking events.
///
/// Each worker owns its synthesizer, so no locking is involved.
pub struct PayloadSynthesizer {
    site_origin: String,
    currency: String,
    purchase_min: u32,
    purchase_max: u32,
    rng: StdRng,
}

impl PayloadSynthesizer {
    /// Create a synthesizer; `seed = None` draws from OS entropy
    pub fn new(config: &PayloadConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            site_origin: config.site_origin.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
            purchase_min: config.purchase_min,
            purchase_max: config.purchase_max.max(config.purchase_min),
            rng,
        }
    }

    /// New visitor; ids come from the synthesizer's rng so seeded runs repeat them
    pub fn user(&mut self) -> SimulatedUser {
        let user_id = self.uuid();
        let session_id = self.uuid();
        let user_agent = pick(&mut self.rng, USER_AGENTS);
        let locale = pick(&mut self.rng, LOCALES);
        SimulatedUser::new(user_id, session_id, user_agent, locale)
    }

    fn uuid(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    pub fn event_kind(&mut self) -> EventKind {
        let roll = self.rng.gen_range(0..EventKind::total_weight());
        EventKind::from_roll(roll)
    }

    pub fn viewport(&mut self) -> Viewport {
        Viewport::new(
            self.rng.gen_range(VIEWPORT_WIDTH_MIN..=VIEWPORT_WIDTH_MAX),
            self.rng.gen_range(VIEWPORT_HEIGHT_MIN..=VIEWPORT_HEIGHT_MAX),
        )
    }

    /// Number of events a new session will send, inclusive of both ends
    pub fn session_length(&mut self, min: usize, max: usize) -> usize {
        let min = min.max(1);
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    pub fn event(&mut self, user: &SimulatedUser) -> TrackingEvent {
        let kind = self.event_kind();
        let page = pick(&mut self.rng, PAGES);
        let referrer = REFERRERS
            .choose(&mut self.rng)
            .copied()
            .flatten()
            .map(str::to_string);
        let viewport = self.viewport();

        let purchase = (kind == EventKind::Purchase).then(|| Purchase {
            value: self.rng.gen_range(self.purchase_min..=self.purchase_max),
            currency: self.currency.clone(),
        });

        TrackingEvent {
            user_id: user.user_id,
            session_id: user.session_id,
            timestamp: Utc::now(),
            kind,
            url: format!("{}{}", self.site_origin, page),
            referrer,
            page: page.to_string(),
            viewport,
            locale: user.locale.clone(),
            user_agent: user.user_agent.clone(),
            purchase,
        }
    }
}

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    fn synthesizer(seed: u64) -> PayloadSynthesizer {
        PayloadSynthesizer::new(&PayloadConfig::default(), Some(seed))
    }

    #[test]
    fn test_kind_distribution_converges() {
        let mut synth = synthesizer(42);
        let samples = 10_000;
        let mut counts: HashMap<EventKind, usize> = HashMap::new();
        for _ in 0..samples {
            *counts.entry(synth.event_kind()).or_default() += 1;
        }

        for kind in EventKind::iter() {
            let observed = counts.get(&kind).copied().unwrap_or(0) as f64 / samples as f64;
            let expected = kind.weight() as f64 / EventKind::total_weight() as f64;
            assert!(
                (observed - expected).abs() < 0.05,
                "{kind}: observed {observed:.3}, expected {expected:.3}"
            );
        }
    }

    #[test]
    fn test_purchase_fields_only_on_purchases() {
        let mut synth = synthesizer(7);
        let user = synth.user();
        let mut saw_purchase = false;
        for _ in 0..5_000 {
            let event = synth.event(&user);
            assert!(event.is_consistent());
            if let Some(purchase) = &event.purchase {
                saw_purchase = true;
                assert!((10..=500).contains(&purchase.value));
                assert_eq!(purchase.currency, "USD");
            }
        }
        assert!(saw_purchase, "5000 draws should include a purchase");
    }

    #[test]
    fn test_event_uses_catalogs_and_user() {
        let mut synth = synthesizer(1);
        let user = synth.user();
        assert!(USER_AGENTS.contains(&user.user_agent.as_str()));
        assert!(LOCALES.contains(&user.locale.as_str()));

        let mut saw_direct = false;
        for _ in 0..500 {
            let event = synth.event(&user);
            assert_eq!(event.user_id, user.user_id);
            assert_eq!(event.session_id, user.session_id);
            assert_eq!(event.locale, user.locale);
            assert!(PAGES.contains(&event.page.as_str()));
            assert_eq!(event.url, format!("https://pixel.example.com{}", event.page));
            match &event.referrer {
                Some(r) => assert!(REFERRERS.contains(&Some(r.as_str()))),
                None => saw_direct = true,
            }
        }
        assert!(saw_direct);
    }

    #[test]
    fn test_seeded_streams_repeat() {
        let mut a = synthesizer(99);
        let mut b = synthesizer(99);
        for _ in 0..20 {
            let user_a = a.user();
            let user_b = b.user();
            assert_eq!(user_a, user_b);
            assert_eq!(user_a.user_id.get_version_num(), 4);

            for _ in 0..10 {
                let event_a = a.event(&user_a);
                let mut event_b = b.event(&user_b);
                event_b.timestamp = event_a.timestamp;
                assert_eq!(event_a, event_b);
            }
        }
    }

    #[test]
    fn test_different_seeds_give_different_users() {
        let user_a = synthesizer(5).user();
        let user_b = synthesizer(6).user();
        assert_ne!(user_a.user_id, user_b.user_id);
        assert_ne!(user_a.user_id, user_a.session_id);
    }

    #[test]
    fn test_session_length_bounds() {
        let mut synth = synthesizer(3);
        for _ in 0..1_000 {
            let n = synth.session_length(1, 50);
            assert!((1..=50).contains(&n));
        }
        assert_eq!(synth.session_length(4, 4), 4);
        assert_eq!(synth.session_length(0, 0), 1);
    }

    proptest! {
        #[test]
        fn prop_viewport_in_range(seed in any::<u64>()) {
            let mut synth = synthesizer(seed);
            for _ in 0..64 {
                let vp = synth.viewport();
                prop_assert!((320..=1920).contains(&vp.width));
                prop_assert!((600..=1080).contains(&vp.height));
            }
        }

        #[test]
        fn prop_events_are_consistent(seed in any::<u64>()) {
            let mut synth = synthesizer(seed);
            let user = synth.user();
            for _ in 0..64 {
                let event = synth.event(&user);
                prop_assert!(event.is_consistent());
                prop_assert!(event.viewport.is_plausible());
            }
        }
    }
}
