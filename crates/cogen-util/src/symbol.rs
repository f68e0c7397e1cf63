//! A small, single-threaded string interner.
//!
//! The transformer and runtime primitives are single-threaded and
//! synchronous, so unlike a multi-threaded compiler front end
//! this interner does not need to be `Sync`: a `thread_local` table
//! backed by `rustc_hash::FxHashMap` is enough, and avoids pulling in
//! `dashmap`/`ahash` for a concern that never crosses a thread
//! boundary here.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

struct Interner {
    strings: Vec<Rc<str>>,
    lookup: FxHashMap<Rc<str>, u32>,
}

impl Interner {
    fn new() -> Self {
        Self { strings: Vec::new(), lookup: FxHashMap::default() }
    }

    fn intern(&mut self, s: &str) -> u32 {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        let rc: Rc<str> = Rc::from(s);
        let id = self.strings.len() as u32;
        self.strings.push(rc.clone());
        self.lookup.insert(rc, id);
        id
    }

    fn resolve(&self, id: u32) -> Rc<str> {
        self.strings[id as usize].clone()
    }
}

/// A compact, copyable handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub fn intern(s: &str) -> Self {
        INTERNER.with(|i| Symbol(i.borrow_mut().intern(s)))
    }

    pub fn as_str(&self) -> Rc<str> {
        INTERNER.with(|i| i.borrow().resolve(self.0))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
