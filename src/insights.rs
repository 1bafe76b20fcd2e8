use crate::records::{Child, Teacher};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// How a child's hobby is compared with a teacher's subject. Every function
/// in this module applies the same policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectMatch {
    Exact,
    #[default]
    CaseInsensitive,
}

impl SubjectMatch {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectMatch::Exact => "exact",
            SubjectMatch::CaseInsensitive => "caseInsensitive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Some(SubjectMatch::Exact),
            "caseinsensitive" | "case_insensitive" | "case-insensitive" => {
                Some(SubjectMatch::CaseInsensitive)
            }
            _ => None,
        }
    }

    fn key(self, s: &str) -> String {
        match self {
            SubjectMatch::Exact => s.to_string(),
            SubjectMatch::CaseInsensitive => s.to_lowercase(),
        }
    }

    pub fn matches(self, hobby: &str, subject: &str) -> bool {
        match self {
            SubjectMatch::Exact => hobby == subject,
            SubjectMatch::CaseInsensitive => {
                hobby == subject || hobby.to_lowercase() == subject.to_lowercase()
            }
        }
    }
}

/// Subjects taught at the school, in first-occurrence order of the teacher
/// list. Teacher subjects are distinct by exact spelling; blank subjects are
/// left out. The match mode only decides which subjects a hobby hits.
#[derive(Debug, Clone)]
pub struct SubjectIndex<'a> {
    subjects: Vec<&'a str>,
    by_subject: HashMap<&'a str, usize>,
    by_hobby_key: HashMap<String, Vec<usize>>,
    mode: SubjectMatch,
}

impl<'a> SubjectIndex<'a> {
    pub fn build(teachers: &'a [Teacher], mode: SubjectMatch) -> Self {
        let mut subjects = Vec::new();
        let mut by_subject = HashMap::new();
        let mut by_hobby_key: HashMap<String, Vec<usize>> = HashMap::new();
        for t in teachers {
            let subject = t.subject.as_str();
            if subject.trim().is_empty() || by_subject.contains_key(subject) {
                continue;
            }
            let pos = subjects.len();
            by_subject.insert(subject, pos);
            by_hobby_key.entry(mode.key(subject)).or_default().push(pos);
            subjects.push(subject);
        }
        Self {
            subjects,
            by_subject,
            by_hobby_key,
            mode,
        }
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn subjects(&self) -> &[&'a str] {
        &self.subjects
    }

    /// Position of a teacher subject, exact spelling.
    pub fn position(&self, subject: &str) -> Option<usize> {
        self.by_subject.get(subject).copied()
    }

    /// Every subject position the hobby matches, ascending.
    pub fn matching(&self, hobby: &str) -> &[usize] {
        self.by_hobby_key
            .get(&self.mode.key(hobby))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Matched subject positions of one child, sorted and without repeats.
    fn positions_of(&self, child: &Child) -> Vec<usize> {
        let mut out: Vec<usize> = child
            .hobbies
            .iter()
            .flat_map(|h| self.matching(h).iter().copied())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectCount<'a> {
    pub subject: &'a str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy<'a> {
    pub counts: Vec<SubjectCount<'a>>,
    /// Hobbies naming no taught subject, in first-seen order.
    pub unmatched: Vec<String>,
}

impl<'a> Occupancy<'a> {
    #[cfg(test)]
    pub fn count(&self, subject: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|c| c.subject == subject)
            .map(|c| c.count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }
}

pub fn occupancy<'a>(index: &SubjectIndex<'a>, children: &[Child]) -> Occupancy<'a> {
    let mut counts = vec![0usize; index.len()];
    let mut unmatched = Vec::new();
    let mut unmatched_seen = HashSet::new();

    for child in children {
        for pos in index.positions_of(child) {
            counts[pos] += 1;
        }
        for hobby in &child.hobbies {
            if index.matching(hobby).is_empty() && unmatched_seen.insert(hobby.clone()) {
                unmatched.push(hobby.clone());
            }
        }
    }

    Occupancy {
        counts: index
            .subjects()
            .iter()
            .zip(counts)
            .map(|(subject, count)| SubjectCount {
                subject: *subject,
                count,
            })
            .collect(),
        unmatched,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster<'a> {
    pub subject: &'a str,
    pub children: Vec<&'a Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rosters<'a> {
    pub by_subject: Vec<Roster<'a>>,
    pub total_children: usize,
}

pub fn rosters<'a>(
    children: &'a [Child],
    teachers: &'a [Teacher],
    mode: SubjectMatch,
) -> Rosters<'a> {
    let index = SubjectIndex::build(teachers, mode);
    let by_subject = index
        .subjects()
        .iter()
        .map(|subject| Roster {
            subject: *subject,
            children: children
                .iter()
                .filter(|c| c.hobbies.iter().any(|h| mode.matches(h, subject)))
                .collect(),
        })
        .collect();
    Rosters {
        by_subject,
        total_children: children.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignments<'a> {
    pub entries: Vec<(&'a str, &'a Teacher)>,
    /// Subjects with more than one teacher. The last one by input order wins.
    pub ambiguous: Vec<&'a str>,
}

impl<'a> Assignments<'a> {
    #[cfg(test)]
    pub fn teacher_for(&self, subject: &str) -> Option<&'a Teacher> {
        self.entries
            .iter()
            .find(|(s, _)| *s == subject)
            .map(|(_, t)| *t)
    }

    pub fn teachers(&self) -> impl Iterator<Item = &'a Teacher> + '_ {
        self.entries.iter().map(|(_, t)| *t)
    }
}

pub fn assignments<'a>(
    children: &[Child],
    teachers: &'a [Teacher],
    mode: SubjectMatch,
) -> Assignments<'a> {
    let index = SubjectIndex::build(teachers, mode);
    let occ = occupancy(&index, children);

    let mut slots: Vec<Option<&'a Teacher>> = vec![None; index.len()];
    let mut hits = vec![0usize; index.len()];
    for teacher in teachers {
        let Some(pos) = index.position(&teacher.subject) else {
            continue;
        };
        if occ.counts[pos].count > 0 {
            slots[pos] = Some(teacher);
            hits[pos] += 1;
        }
    }

    let subjects = index.subjects();
    Assignments {
        entries: slots
            .iter()
            .enumerate()
            .filter_map(|(pos, t)| t.map(|t| (subjects[pos], t)))
            .collect(),
        ambiguous: hits
            .iter()
            .enumerate()
            .filter(|(_, n)| **n > 1)
            .map(|(pos, _)| subjects[pos])
            .collect(),
    }
}

pub fn unregistered(children: &[Child]) -> Vec<&Child> {
    children.iter().filter(|c| c.is_unregistered()).collect()
}

pub fn family_members(children: Vec<Child>, family: Option<&str>) -> Vec<Child> {
    let Some(family) = family else {
        return children;
    };
    let family = family.to_lowercase();
    children
        .into_iter()
        .filter(|c| c.last_name.to_lowercase() == family)
        .collect()
}

pub fn subject_members(
    children: Vec<Child>,
    subject: Option<&str>,
    mode: SubjectMatch,
) -> Vec<Child> {
    let Some(subject) = subject else {
        return children;
    };
    children
        .into_iter()
        .filter(|c| c.hobbies.iter().any(|h| mode.matches(h, subject)))
        .collect()
}

/// Distinct family names, first-seen spelling, in input order.
pub fn families(children: &[Child]) -> Vec<&str> {
    let mut seen = HashSet::new();
    children
        .iter()
        .map(|c| c.last_name.as_str())
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HobbyPair<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub count: usize,
}

pub fn hobby_pairs<'a>(index: &SubjectIndex<'a>, children: &[Child]) -> Vec<HobbyPair<'a>> {
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    for child in children {
        let positions = index.positions_of(child);
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                *counts.entry((*a, *b)).or_insert(0) += 1;
            }
        }
    }

    let subjects = index.subjects();
    let mut out: Vec<HobbyPair<'a>> = counts
        .into_iter()
        .map(|((a, b), count)| HobbyPair {
            first: subjects[a],
            second: subjects[b],
            count,
        })
        .collect();
    out.sort_by(|x, y| {
        y.count
            .cmp(&x.count)
            .then_with(|| x.first.cmp(y.first))
            .then_with(|| x.second.cmp(y.second))
    });
    out
}
