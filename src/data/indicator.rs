use std::fmt;

/// One of the well-known pre-computed threat flag columns.
///
/// The set is a fixed allowlist; detection never infers indicators from the
/// schema, so the detected list is always a subset of [`ThreatIndicator::ALL`]
/// in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThreatIndicator {
    Intrusion,
    MalwareLike,
    Spike,
    RareIp,
}

impl ThreatIndicator {
    /// Candidate order used for detection.
    pub const ALL: [ThreatIndicator; 4] = [
        ThreatIndicator::Intrusion,
        ThreatIndicator::MalwareLike,
        ThreatIndicator::Spike,
        ThreatIndicator::RareIp,
    ];

    pub const fn column_name(self) -> &'static str {
        match self {
            ThreatIndicator::Intrusion => "is_intrusion",
            ThreatIndicator::MalwareLike => "malware_like",
            ThreatIndicator::Spike => "is_spike",
            ThreatIndicator::RareIp => "rare_ip",
        }
    }

    /// Label of the overview counter for this indicator.
    pub const fn metric_label(self) -> &'static str {
        match self {
            ThreatIndicator::Intrusion => "Total Intrusions",
            ThreatIndicator::MalwareLike => "Total Malware",
            ThreatIndicator::Spike => "Total Spikes",
            ThreatIndicator::RareIp => "Rare IP Events",
        }
    }

    /// Column name in title case: `is_intrusion` → `Is Intrusion`.
    pub fn title(self) -> String {
        self.column_name()
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ind| ind.column_name() == name)
    }

    /// Position in [`ThreatIndicator::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            ThreatIndicator::Intrusion => 0,
            ThreatIndicator::MalwareLike => 1,
            ThreatIndicator::Spike => 2,
            ThreatIndicator::RareIp => 3,
        }
    }

    /// Keep the candidates present in `columns`, preserving candidate order.
    pub fn detect<S: AsRef<str>>(columns: &[S]) -> Vec<ThreatIndicator> {
        Self::ALL
            .into_iter()
            .filter(|ind| columns.iter().any(|c| c.as_ref() == ind.column_name()))
            .collect()
    }
}

impl fmt::Display for ThreatIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_keeps_candidate_order() {
        let columns = ["rare_ip", "timestamp", "is_intrusion", "bytes"];
        assert_eq!(
            ThreatIndicator::detect(&columns),
            vec![ThreatIndicator::Intrusion, ThreatIndicator::RareIp]
        );
    }

    #[test]
    fn test_detect_none() {
        let columns = ["timestamp", "src_ip"];
        assert!(ThreatIndicator::detect(&columns).is_empty());
    }

    #[test]
    fn test_detect_is_exact_match() {
        let columns = ["IS_SPIKE", "is_spike_count", " rare_ip"];
        assert!(ThreatIndicator::detect(&columns).is_empty());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(ThreatIndicator::Intrusion.title(), "Is Intrusion");
        assert_eq!(ThreatIndicator::MalwareLike.title(), "Malware Like");
        assert_eq!(ThreatIndicator::RareIp.title(), "Rare Ip");
    }

    #[test]
    fn test_from_column() {
        for ind in ThreatIndicator::ALL {
            assert_eq!(ThreatIndicator::from_column(ind.column_name()), Some(ind));
            assert_eq!(ThreatIndicator::ALL[ind.ordinal()], ind);
        }
        assert_eq!(ThreatIndicator::from_column("timestamp"), None);
    }
}
