// src/crawl/queue.rs
// =============================================================================
// The frontier of a breadth-first crawl.
//
// Two structures live together here:
// - a FIFO queue of URLs waiting to have their links extracted
// - the set of URLs whose links have already been extracted (visited)
//
// The queue may hold the same URL more than once. Duplicates are dropped
// when they come out of the queue, not when they go in.
//
// Rust concepts:
// - VecDeque: Double-ended queue for breadth-first crawling
// - HashSet: To track visited URLs (O(1) lookup)
// =============================================================================

use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    visited: HashSet<String>,
}

impl Frontier {
    // Creates a frontier holding just the seed
    pub fn new(seed: &str) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed.to_string());
        frontier
    }

    pub fn push(&mut self, url: String) {
        self.queue.push_back(url);
    }

    // Pops URLs until one has not been visited, marks it visited and
    // returns it. None once the queue is drained.
    //
    // Marking happens here, before the page is fetched, so a page whose
    // fetch fails is never tried again either.
    pub fn next_unvisited(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.contains(&url) {
                continue;
            }
            self.visited.insert(url.clone());
            return Some(url);
        }
        None
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
