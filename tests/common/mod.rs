//! Shared suite and helpers for integration tests.
//!
//! [`Kitchen`] declares step methods resolved by naming convention and all
//! four lifecycle hooks. Every call is appended to a shared [`Journal`] so
//! tests can observe what ran after the suite instance is gone.
#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};

use stepwire::{
    DataTable,
    DocString,
    TestContext,
    methods,
    runner::Runner,
    suite::{MethodTable, Suite},
};

/// Ordered record of suite calls shared across scenarios.
#[derive(Clone, Debug, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, entry: &str) -> bool { self.entries().iter().any(|e| e == entry) }
}

/// Suite whose state is a cucumber count and a recipe.
#[derive(Debug)]
pub struct Kitchen {
    pub cukes: i64,
    pub recipe: Option<DocString>,
    journal: Journal,
}

impl Kitchen {
    pub fn new(journal: Journal) -> Self {
        Self {
            cukes: 0,
            recipe: None,
            journal,
        }
    }

    pub fn i_have_cukes(&mut self, count: i64) {
        self.journal.push("step:i_have_cukes");
        self.cukes = count;
    }

    pub fn i_eat_cukes(&mut self, count: i64) {
        self.journal.push("step:i_eat_cukes");
        self.cukes -= count;
    }

    pub fn i_should_have_cukes(&mut self, count: i64) {
        self.journal.push("step:i_should_have_cukes");
        assert_eq!(self.cukes, count, "cucumber count");
    }

    pub fn the_recipe_is(&mut self, recipe: DocString) {
        self.journal.push("step:the_recipe_is");
        self.recipe = Some(recipe);
    }

    pub fn the_pantry_contains(&mut self, test: TestContext, pantry: DataTable) {
        self.journal.push("step:the_pantry_contains");
        match pantry.header_table() {
            Ok(table) => {
                for row in 0..table.num_rows() {
                    let count = table.get(row, "count").map(|cell| cell.to_i64());
                    match count {
                        Some(Ok(count)) => self.cukes += count,
                        Some(Err(error)) => test.error(error),
                        None => test.error(format_args!("row {row} has no count")),
                    }
                }
            }
            Err(error) => test.fail_now(error),
        }
    }

    pub fn the_oven_is_broken(&mut self, test: TestContext) {
        self.journal.push("step:the_oven_is_broken");
        test.fail_now("the oven is broken");
    }

    pub fn the_shop_is_closed(&mut self, test: TestContext) {
        self.journal.push("step:the_shop_is_closed");
        test.skip("the shop is closed");
    }

    pub fn i_write_a_note(&mut self, test: TestContext) {
        test.log(format_args!("holding {} cukes", self.cukes));
    }

    fn before(&mut self) { self.journal.push("before"); }

    fn before_step(&mut self, test: TestContext) {
        let step = test.step().unwrap_or_default();
        self.journal.push(format!("before_step:{step}"));
    }

    fn after_step(&mut self) { self.journal.push("after_step"); }

    fn after(&mut self) { self.journal.push("after"); }
}

impl Suite for Kitchen {
    fn methods(table: &mut MethodTable<Self>) {
        methods!(table => Self {
            i_have_cukes,
            i_eat_cukes,
            i_should_have_cukes,
            the_recipe_is,
            the_pantry_contains,
            the_oven_is_broken,
            the_shop_is_closed,
            i_write_a_note,
            before,
            before_step,
            after_step,
            after,
        });
    }
}

/// Runner building a fresh [`Kitchen`] on `journal` for each scenario.
pub fn kitchen(journal: &Journal) -> Runner<Kitchen> {
    let journal = journal.clone();
    Runner::new(move |_| Kitchen::new(journal.clone())).expect("kitchen suite is well formed")
}
