//! Named marks `a` through `z`
//!
//! Marks are plain saved addresses. Unlike bookmarks in a GUI editor they do
//! not follow the data around: inserting or deleting bytes leaves every mark
//! where it was, and nothing ever clears one.

/// Number of mark slots (`a`..=`z`)
pub const MARK_COUNT: usize = 26;

/// The 26 mark slots
#[derive(Debug, Default, Clone)]
pub struct MarkTable {
    slots: [Option<usize>; MARK_COUNT],
}

impl MarkTable {
    /// Create a table with every mark unset
    pub fn new() -> Self {
        Self::default()
    }

    fn index(name: char) -> Option<usize> {
        if name.is_ascii_lowercase() {
            Some(name as usize - 'a' as usize)
        } else {
            None
        }
    }

    /// Set mark `name` to `addr`; returns false if `name` is not `a`..=`z`
    #[must_use = "returns whether the mark name was valid"]
    pub fn set(&mut self, name: char, addr: usize) -> bool {
        match Self::index(name) {
            Some(i) => {
                self.slots[i] = Some(addr);
                true
            }
            None => false,
        }
    }

    /// Address held by mark `name`, if it is a valid name and has been set
    pub fn get(&self, name: char) -> Option<usize> {
        Self::index(name).and_then(|i| self.slots[i])
    }

    /// Iterate over `(name, address)` for every slot
    pub fn iter(&self) -> impl Iterator<Item = (char, Option<usize>)> + '_ {
        ('a'..='z').zip(self.slots.iter().copied())
    }
}
