use crate::error::Error;
use crypto::{
    election::{Ballot, Election, ElectionResult},
    helper::Helper,
    records::{BallotRecord, ElectionRecord, ResultRecord},
};
use log::{debug, info};
use std::{
    convert::TryFrom,
    fs,
    path::{Path, PathBuf},
};

pub const ELECTION_FILE: &str = "election.json";
pub const BALLOTS_FILE: &str = "ballots.jsons";
pub const RESULT_FILE: &str = "result.json";

/// Everything the authority publishes about an election, parsed.
#[derive(Debug)]
pub struct Artifacts {
    pub election: Election,
    pub fingerprint: String,
    pub ballots: Vec<Ballot>,
    pub result: ElectionResult,
}

/// Loads election.json, ballots.jsons and result.json from `dir`.
pub fn load(dir: &Path) -> Result<Artifacts, Error> {
    let election_bytes = read(&dir.join(ELECTION_FILE))?;
    let (election, fingerprint) = parse_election(&election_bytes)?;
    info!("loaded election {} ({})", election.name, election.uuid);

    let ballots_text = read_to_string(&dir.join(BALLOTS_FILE))?;
    let ballots = parse_ballots(&ballots_text)?;
    info!("loaded {} ballots", ballots.len());

    let result_text = read_to_string(&dir.join(RESULT_FILE))?;
    let result = parse_result(&result_text)?;

    Ok(Artifacts {
        election,
        fingerprint,
        ballots,
        result,
    })
}

/// Parses the election and fingerprints the exact bytes it was parsed from.
pub fn parse_election(bytes: &[u8]) -> Result<(Election, String), Error> {
    let record: ElectionRecord = serde_json::from_slice(bytes).map_err(|source| Error::Json {
        file: ELECTION_FILE.to_string(),
        source,
    })?;
    let election = Election::try_from(&record)?;
    let fingerprint = Helper::fingerprint(bytes);
    debug!("election fingerprint: {}", fingerprint);
    Ok((election, fingerprint))
}

/// One ballot JSON object per line, blank lines are skipped.
pub fn parse_ballots(text: &str) -> Result<Vec<Ballot>, Error> {
    let mut ballots = Vec::new();
    for (line, json) in text.lines().enumerate() {
        if json.trim().is_empty() {
            continue;
        }
        let record: BallotRecord = serde_json::from_str(json).map_err(|source| Error::Json {
            file: format!("{} line {}", BALLOTS_FILE, line + 1),
            source,
        })?;
        let ballot = record.parse(&format!("ballots[{}]", ballots.len()))?;
        ballots.push(ballot);
    }
    Ok(ballots)
}

pub fn parse_result(text: &str) -> Result<ElectionResult, Error> {
    let record: ResultRecord = serde_json::from_str(text).map_err(|source| Error::Json {
        file: RESULT_FILE.to_string(),
        source,
    })?;
    Ok(ElectionResult::try_from(&record)?)
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|source| Error::Io {
        path: PathBuf::from(path),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{load, parse_ballots, parse_election, parse_result, BALLOTS_FILE};
    use crate::error::Error;
    use crypto::{
        fixtures::Fixture,
        records::{BallotRecord, ResultRecord},
    };
    use std::fs;

    fn ballots_jsons(fixture: &Fixture) -> String {
        fixture
            .ballots
            .iter()
            .map(|ballot| serde_json::to_string(&BallotRecord::from(ballot)).unwrap())
            .collect::<Vec<String>>()
            .join("\n\n")
    }

    #[test]
    fn it_should_parse_the_election_and_fingerprint_it() {
        let fixture = Fixture::standard();
        let (election, fingerprint) = parse_election(fixture.election_json.as_bytes()).unwrap();

        assert_eq!(election, fixture.election);
        assert_eq!(fingerprint, fixture.fingerprint);
    }

    #[test]
    fn it_should_fingerprint_the_raw_bytes() {
        // re-formatting the file changes the fingerprint, trailing newlines do not
        let fixture = Fixture::standard();
        let with_newline = format!("{}\n", fixture.election_json);
        let (_, fingerprint) = parse_election(with_newline.as_bytes()).unwrap();
        assert_eq!(fingerprint, fixture.fingerprint);

        let value: serde_json::Value = serde_json::from_str(&fixture.election_json).unwrap();
        let pretty = serde_json::to_string_pretty(&value).unwrap();
        let (election, fingerprint) = parse_election(pretty.as_bytes()).unwrap();
        assert_eq!(election, fixture.election);
        assert_ne!(fingerprint, fixture.fingerprint);
    }

    #[test]
    fn it_should_parse_ballots_and_skip_blank_lines() {
        let fixture = Fixture::standard();
        let text = format!("\n{}\n\n", ballots_jsons(&fixture));

        let ballots = parse_ballots(&text).unwrap();
        assert_eq!(ballots, fixture.ballots);
    }

    #[test]
    fn it_should_name_the_line_of_invalid_json() {
        let fixture = Fixture::standard();
        let text = format!("{}\n{{\"answers\": ", ballots_jsons(&fixture));

        match parse_ballots(&text) {
            Err(Error::Json { file, .. }) => {
                assert_eq!(file, format!("{} line {}", BALLOTS_FILE, 10));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn it_should_name_the_ballot_with_a_malformed_number() {
        let fixture = Fixture::standard();
        let mut record = BallotRecord::from(&fixture.ballots[1]);
        record.signature.challenge = "12x".to_string();
        let text = format!(
            "{}\n{}",
            serde_json::to_string(&BallotRecord::from(&fixture.ballots[0])).unwrap(),
            serde_json::to_string(&record).unwrap()
        );

        match parse_ballots(&text) {
            Err(Error::Audit(crypto::error::Error::MalformedNumber { field, value })) => {
                assert_eq!(field, "ballots[1].signature.challenge");
                assert_eq!(value, "12x");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn it_should_parse_the_result() {
        let fixture = Fixture::standard();
        let text = serde_json::to_string(&ResultRecord::from(&fixture.result)).unwrap();
        assert_eq!(parse_result(&text).unwrap(), fixture.result);
    }

    #[test]
    fn it_should_load_an_election_directory() {
        let fixture = Fixture::standard();
        let dir = std::env::temp_dir().join(format!("belenios-audit-{}", fixture.election.params.y));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("election.json"), &fixture.election_json).unwrap();
        fs::write(dir.join("ballots.jsons"), ballots_jsons(&fixture)).unwrap();
        fs::write(
            dir.join("result.json"),
            serde_json::to_string(&ResultRecord::from(&fixture.result)).unwrap(),
        )
        .unwrap();

        let artifacts = load(&dir).unwrap();
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(artifacts.election, fixture.election);
        assert_eq!(artifacts.fingerprint, fixture.fingerprint);
        assert_eq!(artifacts.ballots, fixture.ballots);
        assert_eq!(artifacts.result, fixture.result);
    }

    #[test]
    fn it_should_report_a_missing_file() {
        let dir = std::env::temp_dir().join("belenios-audit-missing-directory");
        assert!(matches!(load(&dir), Err(Error::Io { .. })));
    }
}
