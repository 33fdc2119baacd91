//! Connectivity patterns of projections.
//!
//! A [`Connector`] is realized into an explicit list of
//! `(source_index, target_index)` pairs. Realization is deterministic: the
//! probabilistic connector draws from a seeded RNG, so two runs over the
//! same network enumerate exactly the same synapses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// How the neurons of a source population connect to those of a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Connector {
    /// Neuron `i` of the source connects to neuron `i` of the target.
    OneToOne,
    /// Every source neuron connects to every target neuron.
    AllToAll {
        /// Keep `i -> i` pairs when source and target are the same population.
        #[serde(default = "default_true")]
        allow_self_connections: bool,
    },
    /// Each pair is connected independently with probability `p_connect`.
    FixedProbability {
        /// Connection probability in `0.0..=1.0`.
        p_connect: f64,
        /// RNG seed.
        #[serde(default)]
        seed: u64,
    },
    /// An explicit list of `[source, target]` index pairs.
    FromList {
        /// The connected pairs.
        pairs: Vec<[u32; 2]>,
    },
}

fn default_true() -> bool {
    true
}

impl Connector {
    /// Checks the connector against the endpoint sizes.
    pub fn validate(&self, source_size: u32, target_size: u32) -> Result<(), String> {
        match self {
            Connector::OneToOne if source_size != target_size => Err(format!(
                "one-to-one needs equal sizes, got {source_size} and {target_size}"
            )),
            Connector::FixedProbability { p_connect, .. }
                if !(0.0..=1.0).contains(p_connect) =>
            {
                Err(format!("connection probability {p_connect} is outside [0, 1]"))
            }
            Connector::FromList { pairs } => {
                match pairs
                    .iter()
                    .find(|[s, t]| *s >= source_size || *t >= target_size)
                {
                    Some([s, t]) => Err(format!("pair ({s}, {t}) is out of range")),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Enumerates the connected `(source_index, target_index)` pairs.
    ///
    /// `same_population` is set when source and target are the same
    /// population; it only affects self-connections of [`Connector::AllToAll`].
    pub fn realize(&self, source_size: u32, target_size: u32, same_population: bool) -> Vec<(u32, u32)> {
        match self {
            Connector::OneToOne => (0..source_size.min(target_size)).map(|i| (i, i)).collect(),
            Connector::AllToAll {
                allow_self_connections,
            } => {
                let skip_self = same_population && !allow_self_connections;
                (0..source_size)
                    .flat_map(|s| (0..target_size).map(move |t| (s, t)))
                    .filter(|(s, t)| !(skip_self && s == t))
                    .collect()
            }
            Connector::FixedProbability { p_connect, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                let mut pairs = Vec::new();
                for s in 0..source_size {
                    for t in 0..target_size {
                        if rng.gen::<f64>() < *p_connect {
                            pairs.push((s, t));
                        }
                    }
                }
                pairs
            }
            Connector::FromList { pairs } => pairs.iter().map(|[s, t]| (*s, *t)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_to_one() {
        let c = Connector::OneToOne;
        assert_eq!(c.realize(3, 3, false), vec![(0, 0), (1, 1), (2, 2)]);
        assert!(c.validate(3, 4).is_err());
    }

    #[test]
    fn all_to_all_counts() {
        let c = Connector::AllToAll {
            allow_self_connections: true,
        };
        assert_eq!(c.realize(2, 5, false).len(), 10);
        assert_eq!(c.realize(3, 3, true).len(), 9);
    }

    #[test]
    fn all_to_all_without_self_connections() {
        let c = Connector::AllToAll {
            allow_self_connections: false,
        };
        let pairs = c.realize(3, 3, true);
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(s, t)| s != t));
        // Different populations with equal indices are not self-connections.
        assert_eq!(c.realize(3, 3, false).len(), 9);
    }

    #[test]
    fn fixed_probability_is_deterministic() {
        let c = Connector::FixedProbability {
            p_connect: 0.3,
            seed: 42,
        };
        let a = c.realize(20, 20, false);
        let b = c.realize(20, 20, false);
        assert_eq!(a, b);
        assert!(!a.is_empty() && a.len() < 400);
    }

    #[test]
    fn fixed_probability_extremes() {
        let none = Connector::FixedProbability {
            p_connect: 0.0,
            seed: 1,
        };
        let all = Connector::FixedProbability {
            p_connect: 1.0,
            seed: 1,
        };
        assert!(none.realize(5, 5, false).is_empty());
        assert_eq!(all.realize(5, 5, false).len(), 25);
        assert!(Connector::FixedProbability {
            p_connect: 1.5,
            seed: 0
        }
        .validate(1, 1)
        .is_err());
    }

    #[test]
    fn from_list_range_check() {
        let c = Connector::FromList {
            pairs: vec![[0, 1], [2, 0]],
        };
        assert!(c.validate(3, 2).is_ok());
        assert!(c.validate(2, 2).is_err());
        assert_eq!(c.realize(3, 2, false), vec![(0, 1), (2, 0)]);
    }

    #[test]
    fn parse_tagged_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            connector: Connector,
        }
        let w: Wrapper = toml::from_str(
            r#"
[connector]
kind = "all_to_all"
"#,
        )
        .unwrap();
        assert_eq!(
            w.connector,
            Connector::AllToAll {
                allow_self_connections: true
            }
        );
    }
}
