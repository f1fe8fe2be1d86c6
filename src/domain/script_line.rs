// ============================================================
// Layer 3 — Script Line Domain Types
// ============================================================
// A script line is one utterance (or stage direction) from a
// film/TV script, attributed to a character. Three shapes:
//
//   ScriptLine  — raw training row: id, content, character, emotions
//   TestLine    — raw test row:     id, content, character
//   DerivedRow  — the intermediate row written to train.csv/test.csv:
//                 id, content, character, text, love..sorrow
//
// The model never sees content and character separately; it
// sees `text`, the content followed by a role marker and the
// character name.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

use crate::domain::emotions::Emotions;

/// Role marker placed between content and character name in training text.
pub const TRAIN_ROLE_MARKER: &str = "角色: ";

/// Role marker used for test text. Carries a leading space, unlike the
/// training marker. Published baselines were trained on exactly this split.
pub const TEST_ROLE_MARKER: &str = " 角色: ";

/// Raw training row, emotions still as the "a,b,c,d,e,f" string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub id:        String,
    pub content:   String,
    pub character: String,
    pub emotions:  String,
}

impl ScriptLine {
    pub fn new(
        id:        impl Into<String>,
        content:   impl Into<String>,
        character: impl Into<String>,
        emotions:  impl Into<String>,
    ) -> Self {
        Self {
            id:        id.into(),
            content:   content.into(),
            character: character.into(),
            emotions:  emotions.into(),
        }
    }

    pub fn text(&self) -> String {
        compose_text(&self.content, TRAIN_ROLE_MARKER, &self.character)
    }
}

/// Raw test row. Any further columns in the file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestLine {
    pub id:        String,
    pub content:   String,
    pub character: String,
}

impl TestLine {
    pub fn text(&self) -> String {
        compose_text(&self.content, TEST_ROLE_MARKER, &self.character)
    }
}

/// Row of the derived train.csv / test.csv files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub id:        String,
    pub content:   String,
    pub character: String,
    pub text:      String,
    pub love:      u8,
    pub joy:       u8,
    pub fright:    u8,
    pub anger:     u8,
    pub fear:      u8,
    pub sorrow:    u8,
}

impl DerivedRow {
    pub fn from_train(line: &ScriptLine, labels: Emotions<u8>) -> Self {
        Self::build(&line.id, &line.content, &line.character, line.text(), labels)
    }

    /// Test rows have no ground truth; labels are zero.
    pub fn from_test(line: &TestLine) -> Self {
        Self::build(&line.id, &line.content, &line.character, line.text(), Emotions::default())
    }

    fn build(id: &str, content: &str, character: &str, text: String, l: Emotions<u8>) -> Self {
        Self {
            id:        id.to_string(),
            content:   content.to_string(),
            character: character.to_string(),
            text,
            love:      l.love,
            joy:       l.joy,
            fright:    l.fright,
            anger:     l.anger,
            fear:      l.fear,
            sorrow:    l.sorrow,
        }
    }

    pub fn labels(&self) -> Emotions<u8> {
        Emotions {
            love:   self.love,
            joy:    self.joy,
            fright: self.fright,
            anger:  self.anger,
            fear:   self.fear,
            sorrow: self.sorrow,
        }
    }
}

fn compose_text(content: &str, marker: &str, character: &str) -> String {
    format!("{content}{marker}{character}")
}
