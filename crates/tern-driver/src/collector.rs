//! Diagnostic collection
//!
//! Walks the loaded graph from the roots, visiting each unit once, and
//! returns every diagnostic reachable from the requested targets in report
//! order.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::loader::LoadSession;
use crate::unit::{Diagnostic, Position};

/// Collect the diagnostics of every unit reachable from the session's roots.
///
/// Units are visited pre-order: roots in order, then each unit's imports in
/// import order. Within a unit, diagnostics without a position come first,
/// followed by positioned ones sorted by file, line and column. A
/// diagnostic identical in position and message to one already collected
/// is skipped.
pub fn collect(session: &LoadSession) -> Vec<&Diagnostic> {
    let mut visited = FxHashSet::default();
    let mut seen: FxHashSet<(Option<&Position>, &str)> = FxHashSet::default();
    let mut collected = Vec::new();
    let mut stack: Vec<usize> = session.roots.iter().rev().copied().collect();

    while let Some(idx) = stack.pop() {
        if !visited.insert(idx) {
            continue;
        }
        let unit = session.graph.get(idx);

        let (mut positioned, unpositioned): (Vec<&Diagnostic>, Vec<&Diagnostic>) =
            unit.diagnostics.iter().partition(|d| d.position.is_some());
        positioned.sort_by(|a, b| a.position.cmp(&b.position));

        for diagnostic in unpositioned.into_iter().chain(positioned) {
            if seen.insert((diagnostic.position.as_ref(), diagnostic.message.as_str())) {
                collected.push(diagnostic);
            }
        }

        stack.extend(unit.imports.iter().rev().copied());
    }

    debug!(units = visited.len(), diagnostics = collected.len(), "collected diagnostics");
    collected
}
