/// A forward-only cursor for delimiter scanning with position tracking.
///
/// Operates over a string slice while tracking the absolute byte position
/// in the document (via `base` offset). All moves land on char boundaries.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Base offset in the document (added to local index for absolute positions).
    pub base: usize,
    /// Current local index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `s` with the given base offset.
    pub fn new(s: &'a str, base: usize) -> Self {
        Self { s, base, i: 0 }
    }

    /// Returns the current absolute byte position (base + local index).
    pub fn pos(&self) -> usize {
        self.base + self.i
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Checks if the remaining input starts with `pat`.
    pub fn starts_with(&self, pat: &str) -> bool {
        self.rest().starts_with(pat)
    }

    /// The unscanned remainder of the input.
    pub fn rest(&self) -> &'a str {
        self.s.get(self.i..).unwrap_or("")
    }

    /// Moves to the next occurrence of `pat`, leaving the cursor on its first
    /// byte. On a miss the cursor does not move and `None` is returned.
    pub fn seek(&mut self, pat: &str) -> Option<usize> {
        let found = self.rest().find(pat)?;
        self.i += found;
        Some(self.pos())
    }

    /// Advances past one whole character, returning it.
    pub fn bump_char(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.i += c.len_utf8();
        Some(c)
    }

    /// Advances by `n` bytes. Caller keeps `i + n` on a char boundary.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Repositions the cursor at an absolute document offset.
    pub fn reset_to(&mut self, pos: usize) {
        self.i = pos.saturating_sub(self.base);
    }
}
