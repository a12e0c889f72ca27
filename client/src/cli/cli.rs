use clap::Parser;
use crypto::{
    audit::{AuditConfig, FailurePolicy},
    decryption::FactorSource,
};
use std::path::PathBuf;

/// Verifies a homomorphic (Belenios) election from its published files:
/// election.json, ballots.jsons and result.json
#[derive(Parser, Debug)]
#[clap(name = "belenios-audit", version = "0.1.0", author = "Moritz Eck")]
pub struct Opts {
    /// The directory holding the election files
    #[clap(short, long)]
    pub dir: PathBuf,
    /// Verify every ballot and report all invalid ones instead of stopping
    /// at the first
    #[clap(long)]
    pub collect_all: bool,
    /// Verify ballots and compute the tally on all cores
    #[clap(long)]
    pub parallel: bool,
    /// Decrypt with the product of the factors of all trustees instead of
    /// the first trustee's alone
    #[clap(long)]
    pub combine_trustees: bool,
}

impl Opts {
    pub fn config(&self) -> AuditConfig {
        AuditConfig {
            policy: if self.collect_all {
                FailurePolicy::CollectAll
            } else {
                FailurePolicy::FailFast
            },
            parallel: self.parallel,
            factors: if self.combine_trustees {
                FactorSource::AllTrustees
            } else {
                FactorSource::FirstTrustee
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Opts;
    use clap::Parser;
    use crypto::{
        audit::{AuditConfig, FailurePolicy},
        decryption::FactorSource,
    };
    use std::path::PathBuf;

    #[test]
    fn it_should_default_to_the_default_audit() {
        let opts = Opts::parse_from(&["belenios-audit", "--dir", "election"]);
        assert_eq!(opts.dir, PathBuf::from("election"));
        assert_eq!(opts.config(), AuditConfig::default());
    }

    #[test]
    fn it_should_map_every_flag() {
        let opts = Opts::parse_from(&[
            "belenios-audit",
            "-d",
            "election",
            "--collect-all",
            "--parallel",
            "--combine-trustees",
        ]);
        let config = opts.config();
        assert_eq!(config.policy, FailurePolicy::CollectAll);
        assert!(config.parallel);
        assert_eq!(config.factors, FactorSource::AllTrustees);
    }

    #[test]
    fn it_should_require_a_directory() {
        assert!(Opts::try_parse_from(&["belenios-audit", "--parallel"]).is_err());
    }
}
