/// Editor Widget Seam
///
/// The text-editing component is opaque: the core only gets/sets the
/// whole buffer and picks a syntax mode. Two implementations:
/// - `BufferEditor`: in-memory buffer
/// - `FileEditor`: buffer mirrored to a file the user edits with any tool
///
/// The fixed language tables (syntax mode, boilerplate) live here too.

use codelab_common::types::Language;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Syntax-highlighting mode identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxMode {
    Python,
    CLike,
    Java,
    PlainText,
}

impl SyntaxMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxMode::Python => "python",
            SyntaxMode::CLike => "text/x-c++src",
            SyntaxMode::Java => "text/x-java",
            SyntaxMode::PlainText => "text/plain",
        }
    }
}

/// Mode for a language; unmapped languages edit as plain text
pub fn syntax_mode(language: &Language) -> SyntaxMode {
    match language {
        Language::Python => SyntaxMode::Python,
        Language::C | Language::Cpp => SyntaxMode::CLike,
        Language::Java => SyntaxMode::Java,
        Language::Other(_) => SyntaxMode::PlainText,
    }
}

const PYTHON_BOILERPLATE: &str = concat!(
    "# Python Program\n",
    "print(\"Hello, World!\")\n",
    "\n",
    "# Add your code here\n",
);

const C_BOILERPLATE: &str = concat!(
    "#include <stdio.h>\n",
    "\n",
    "int main() {\n",
    "    printf(\"Hello, World!\\n\");\n",
    "    \n",
    "    // Add your code here\n",
    "    \n",
    "    return 0;\n",
    "}\n",
);

const CPP_BOILERPLATE: &str = concat!(
    "#include <iostream>\n",
    "using namespace std;\n",
    "\n",
    "int main() {\n",
    "    cout << \"Hello, World!\" << endl;\n",
    "    \n",
    "    // Add your code here\n",
    "    \n",
    "    return 0;\n",
    "}\n",
);

const JAVA_BOILERPLATE: &str = concat!(
    "public class Main {\n",
    "    public static void main(String[] args) {\n",
    "        System.out.println(\"Hello, World!\");\n",
    "        \n",
    "        // Add your code here\n",
    "    }\n",
    "}\n",
);

/// Starter program shown when a language has no draft; empty when unregistered
pub fn boilerplate(language: &Language) -> &'static str {
    match language {
        Language::Python => PYTHON_BOILERPLATE,
        Language::C => C_BOILERPLATE,
        Language::Cpp => CPP_BOILERPLATE,
        Language::Java => JAVA_BOILERPLATE,
        Language::Other(_) => "",
    }
}

pub trait Editor: Send {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str);
    fn mode(&self) -> SyntaxMode;
    fn set_mode(&mut self, mode: SyntaxMode);

    /// Reconcile the visible buffer with its backing storage, if any
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BufferEditor {
    text: String,
    mode: SyntaxMode,
}

impl BufferEditor {
    pub fn new() -> Self {
        Self::with_text("")
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            mode: SyntaxMode::PlainText,
        }
    }
}

impl Default for BufferEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor for BufferEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn mode(&self) -> SyntaxMode {
        self.mode
    }

    fn set_mode(&mut self, mode: SyntaxMode) {
        self.mode = mode;
    }
}

/// Buffer mirrored to a file on disk.
///
/// `set_text` only marks the buffer dirty; `sync` writes pending content,
/// or picks up edits made to the file by another program when clean.
#[derive(Debug)]
pub struct FileEditor {
    path: PathBuf,
    text: String,
    mode: SyntaxMode,
    dirty: bool,
}

impl FileEditor {
    /// Open the buffer file; a missing file is an empty buffer
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let text = read_or_empty(&path)?;
        Ok(Self {
            path,
            text,
            mode: SyntaxMode::PlainText,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn read_or_empty(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

impl Editor for FileEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.dirty = true;
    }

    fn mode(&self) -> SyntaxMode {
        self.mode
    }

    fn set_mode(&mut self, mode: SyntaxMode) {
        self.mode = mode;
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.dirty {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, &self.text)?;
            self.dirty = false;
        } else {
            self.text = read_or_empty(&self.path)?;
        }
        Ok(())
    }
}
