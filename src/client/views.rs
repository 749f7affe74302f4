//! Derived views computed on the client from a fetched collection.
//!
//! The API never filters; searching, grouping and counting happen here.

use std::collections::BTreeMap;

use crate::models::{
    Draft, DraftStatus, Idea, Learning, LearningCategory, LearningStatus, Note,
    Task, TaskStatus,
};

/// Tasks split into board columns, each in collection order.
#[derive(Debug, Default)]
pub struct TaskBoard<'a> {
    pub todo: Vec<&'a Task>,
    pub in_progress: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

impl<'a> TaskBoard<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut board = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => board.todo.push(task),
                TaskStatus::InProgress => board.in_progress.push(task),
                TaskStatus::Done => board.done.push(task),
            }
        }
        board
    }
}

/// Notes whose title or content contains `term`, ignoring case. An empty
/// term matches everything.
pub fn search_notes<'a>(notes: &'a [Note], term: &str) -> Vec<&'a Note> {
    let term = term.to_lowercase();
    notes
        .iter()
        .filter(|note| {
            note.title.to_lowercase().contains(&term) || note.content.to_lowercase().contains(&term)
        })
        .collect()
}

/// Status and category filter for the learnings list. `None` means "all".
#[derive(Debug, Clone, Copy, Default)]
pub struct LearningFilter {
    pub status: Option<LearningStatus>,
    pub category: Option<LearningCategory>,
}

impl LearningFilter {
    pub fn matches(&self, learning: &Learning) -> bool {
        self.status.is_none_or(|status| learning.status == status)
            && self.category.is_none_or(|category| learning.category == category)
    }

    pub fn apply<'a>(&self, learnings: &'a [Learning]) -> Vec<&'a Learning> {
        learnings.iter().filter(|l| self.matches(l)).collect()
    }
}

pub fn unread_count(learnings: &[Learning]) -> usize {
    learnings
        .iter()
        .filter(|l| l.status == LearningStatus::Unread)
        .count()
}

pub fn ideas_by_category(ideas: &[Idea]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for idea in ideas {
        *counts.entry(idea.category.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Drafts ready to post, newest first as stored.
pub fn ready_drafts(drafts: &[Draft]) -> Vec<&Draft> {
    drafts
        .iter()
        .filter(|d| d.status == DraftStatus::Ready)
        .collect()
}
