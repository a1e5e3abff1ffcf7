//! Drill and instruction records

use std::collections::BTreeSet;

use super::{Description, EntityName, Step, Violations, VideoId};

/// One numbered how-to entry of a drill, keyed by `(drill_id, number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Parent drill; `None` until the drill has been persisted
    pub drill_id: Option<i64>,
    /// 1-based position within the drill
    pub number: i32,
    pub description: String,
    pub steps: Vec<String>,
    pub video_id: Option<String>,
}

impl Instruction {
    /// Validate raw fields. Step errors are reported as `steps[i]`.
    pub fn parse<S: AsRef<str>>(
        number: i32,
        description: &str,
        steps: &[S],
        video_id: Option<&str>,
    ) -> Result<Self, Violations> {
        let mut v = Violations::new();
        let description = v.check(Description::new(description));
        let video_id = v.check(VideoId::parse(video_id));

        let mut parsed = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            match Step::new(step.as_ref()) {
                Ok(step) => parsed.push(step.into_string()),
                Err(e) => v.push_at(format!("steps[{}]", i), e),
            }
        }

        match (description, video_id) {
            (Some(description), Some(video_id)) if v.is_empty() => Ok(Self {
                drill_id: None,
                number,
                description: description.into_string(),
                steps: parsed,
                video_id: video_id.map(VideoId::into_string),
            }),
            _ => Err(v),
        }
    }
}

/// A drill with its links and instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drill {
    pub id: Option<i64>,
    /// Epoch millis of the last save
    pub update_timestamp: i64,
    pub name: String,
    pub categories: BTreeSet<i64>,
    pub sub_categories: BTreeSet<i64>,
    /// Weak references to other drills, in submitted order
    pub related_drills: Vec<i64>,
    pub instructions: Vec<Instruction>,
}

impl Drill {
    /// Unsaved drill with no links or instructions.
    pub fn new(name: EntityName) -> Self {
        Self {
            id: None,
            update_timestamp: 0,
            name: name.into_string(),
            categories: BTreeSet::new(),
            sub_categories: BTreeSet::new(),
            related_drills: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Instruction by its 1-based number.
    pub fn instruction(&self, number: i32) -> Option<&Instruction> {
        self.instructions.iter().find(|i| i.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_instruction() {
        let ins = Instruction::parse(1, "Block high", &["raise arm", "step back"], Some("abc"))
            .unwrap();
        assert_eq!(ins.drill_id, None);
        assert_eq!(ins.steps, ["raise arm", "step back"]);
        assert_eq!(ins.video_id.as_deref(), Some("abc"));
    }

    #[test]
    fn delimiter_step_is_located() {
        let err = Instruction::parse(1, "Block", &["ok", "a|b"], None).unwrap_err();
        let paths: Vec<_> = err.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, ["steps[1]"]);
    }

    #[test]
    fn empty_description_and_bad_step_both_reported() {
        let err = Instruction::parse(1, " ", &["|"], None).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn lookup_by_number() {
        let mut drill = Drill::new(EntityName::new("Wrist escape").unwrap());
        drill.instructions = vec![
            Instruction::parse(1, "First", &[] as &[&str], None).unwrap(),
            Instruction::parse(2, "Second", &[] as &[&str], None).unwrap(),
        ];
        assert_eq!(drill.instruction(2).map(|i| i.description.as_str()), Some("Second"));
        assert!(drill.instruction(3).is_none());
    }
}
