//! Breadth-first crawl frontier
//!
//! Holds the FIFO queue of pages still to visit, the set of pages already
//! visited and the deduplicated collection of every link discovered.

use crate::model::Link;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Link>,
    visited: HashSet<String>,
    collected: Vec<Link>,
    collected_urls: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed page
    pub fn seeded(seed_url: &str) -> Self {
        let mut frontier = Self::default();
        frontier.queue.push_back(Link::page(seed_url));
        frontier
    }

    /// Pops the next page worth visiting and marks it visited
    ///
    /// Entries that were already visited or are not pages are dropped.
    pub fn next_page(&mut self) -> Option<Link> {
        while let Some(link) = self.queue.pop_front() {
            if !link.is_page() || self.visited.contains(&link.url) {
                continue;
            }
            self.visited.insert(link.url.clone());
            return Some(link);
        }
        None
    }

    /// Adds newly discovered links, returning how many were new
    ///
    /// A link is new when it is neither visited nor already collected. New
    /// pages are also queued for traversal.
    pub fn absorb(&mut self, links: Vec<Link>) -> usize {
        let mut added = 0;
        for link in links {
            if self.visited.contains(&link.url) || self.collected_urls.contains(&link.url) {
                continue;
            }
            self.collected_urls.insert(link.url.clone());
            if link.is_page() {
                self.queue.push_back(link.clone());
            }
            self.collected.push(link);
            added += 1;
        }
        added
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn collected(&self) -> &[Link] {
        &self.collected
    }

    pub fn into_links(self) -> Vec<Link> {
        self.collected
    }
}
