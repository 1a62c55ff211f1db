use std::collections::{BTreeMap, HashMap};

use chrono::{Local, NaiveDate};
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::{
    command::{CommandError, CommandRunner},
    git::for_each_ref,
};

pub const DEFAULT_REF: &str = "refs/remotes/origin";

const REF_FORMAT: &str = "%(committerdate:short) %(refname:short) %(committername)";

#[derive(Error, Debug)]
pub enum StaleReportError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Unexpected ref line `{0}`, expected `<date> <branch> <author>`")]
    MalformedRef(String),
    #[error("Bad commit date `{date}`: {source}")]
    BadDate {
        date: String,
        source: chrono::ParseError,
    },
    #[error("Could not serialize report: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleBranch {
    pub days: i64,
    pub branch: String,
    pub author: String,
}

/// Branches under `reference` whose last commit is at least `days` old.
pub fn find_stale_branches<R: CommandRunner>(
    runner: &R,
    days: i64,
    reference: &str,
) -> Result<Vec<StaleBranch>, StaleReportError> {
    let today = Local::now().date_naive();
    let result = runner.run(&for_each_ref(reference, REF_FORMAT).read_only())?;
    stale_branches_from(&result.stdout, days, today)
}

fn stale_branches_from(
    output: &str,
    days: i64,
    today: NaiveDate,
) -> Result<Vec<StaleBranch>, StaleReportError> {
    let mut branches = Vec::new();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let mut fields = line.split_whitespace();
        let (Some(date), Some(branch)) = (fields.next(), fields.next()) else {
            return Err(StaleReportError::MalformedRef(line.to_owned()));
        };
        let author = fields.collect::<Vec<_>>().join(" ");
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|source| {
            StaleReportError::BadDate {
                date: date.to_owned(),
                source,
            }
        })?;
        let age = (today - date).num_days();
        if age >= days {
            branches.push(StaleBranch {
                days: age,
                branch: branch.to_owned(),
                author,
            });
        } else {
            debug!("{} is {} days old, skipping", branch, age);
        }
    }
    Ok(branches)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBranches {
    pub branches: Vec<BTreeMap<String, i64>>,
    pub count: usize,
}

/// Stale branches grouped by author; serializes as `authors: [{<author>: {branches, count}}]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleReport {
    pub authors: Vec<BTreeMap<String, AuthorBranches>>,
}

impl StaleReport {
    /// Authors with the most stale branches come first, ties keep first-seen order.
    /// Within an author the oldest branch comes first.
    pub fn new(branches: &[StaleBranch]) -> Self {
        let mut order: Vec<(&str, Vec<&StaleBranch>)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for branch in branches {
            let position = *index.entry(branch.author.as_str()).or_insert_with(|| {
                order.push((branch.author.as_str(), Vec::new()));
                order.len() - 1
            });
            order[position].1.push(branch);
        }

        order.sort_by(|(_, a), (_, b)| b.len().cmp(&a.len()));

        let authors = order
            .into_iter()
            .map(|(author, mut branches)| {
                branches.sort_by(|a, b| b.days.cmp(&a.days));
                let entry = AuthorBranches {
                    count: branches.len(),
                    branches: branches
                        .into_iter()
                        .map(|branch| BTreeMap::from([(branch.branch.clone(), branch.days)]))
                        .collect(),
                };
                BTreeMap::from([(author.to_owned(), entry)])
            })
            .collect();

        StaleReport { authors }
    }

    pub fn to_yaml(&self) -> Result<String, StaleReportError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
