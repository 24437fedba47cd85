//! Fixtures shared by the decoder benchmarks.

/// A named benchmark input.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    size: Size,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, size: Size, file: TestFile) -> Self {
        Self { name, size, file }
    }

    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, Size::Small, file)
    }

    pub fn large(name: &'static str, file: TestFile) -> Self {
        Self::new(name, Size::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }
}

/// A raw HTTP response captured in `resources/response`.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    /// The bytes after the response head, or everything if no head terminator is found.
    pub fn body(&self) -> &'static [u8] {
        let bytes = self.content.as_bytes();
        let offset = bytes.windows(4).position(|window| window == b"\r\n\r\n").map_or(0, |position| position + 4);
        &bytes[offset..]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    Small,
    Large,
}

impl Size {
    /// Criterion samples per benchmark; large inputs take fewer to keep runs short.
    pub fn sample_size(self) -> usize {
        match self {
            Size::Small => 100,
            Size::Large => 20,
        }
    }
}
