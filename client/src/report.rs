use crypto::{audit::AuditReport, election::Election};
use std::fmt;

/// The election header: name, description, identifiers and fingerprint.
pub struct ElectionHeader<'a> {
    pub election: &'a Election,
    pub fingerprint: &'a str,
    pub ballots: usize,
}

impl fmt::Display for ElectionHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let election = self.election;
        writeln!(f, "= {} =", election.name)?;
        writeln!(f, "{}", election.description)?;
        writeln!(f)?;
        writeln!(f, "ID : {}", election.uuid)?;
        writeln!(f, "Admin : {}", election.administrator)?;
        writeln!(f, "Credential Authority : {}", election.credential_authority)?;
        writeln!(f, "Fingerprint : {}", self.fingerprint)?;
        writeln!(f)?;
        writeln!(f, "Question(s) : {}", election.questions.len())?;
        writeln!(f, "Ballots : {}", self.ballots)
    }
}

/// Per question: the bounds unless max is 1, the blank count on
/// blank-enabled questions, then each answer's count.
pub struct Results<'a> {
    pub election: &'a Election,
    pub counts: &'a [Vec<u64>],
}

impl fmt::Display for Results<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (question, counts) in self.election.questions.iter().zip(self.counts.iter()) {
            writeln!(f, "* {}", question.question)?;
            if question.max != 1 {
                writeln!(f, "  (min {}, max {})", question.min, question.max)?;
            }
            let offset = if question.blank {
                writeln!(f, "  - Blank : {}", counts[0])?;
                1
            } else {
                0
            };
            for (answer, count) in question.answers.iter().zip(counts[offset..].iter()) {
                writeln!(f, "  - {} : {}", answer, count)?;
            }
        }
        Ok(())
    }
}

/// One line per invalid ballot.
pub struct Failures<'a>(pub &'a AuditReport);

impl fmt::Display for Failures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in self.0.failures.iter() {
            writeln!(f, "ballot #{}: {}", failure.index, failure.error)?;
        }
        Ok(())
    }
}
