//! # Vocabulary Resolution
//!
//! Maps model names to BPE vocabularies, and wraps `tiktoken-rs` encoders as
//! a [`TokenCounter`].

use std::sync::Arc;

use tiktoken_rs::{
    CoreBPE,
    Rank,
    tokenizer::{Tokenizer, get_tokenizer},
};

use crate::{
    counting::TokenCounter,
    errors::{TCResult, TokencountError},
};

/// A pretrained BPE vocabulary.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::EnumIter,
    strum::Display,
)]
pub enum Vocabulary {
    /// GPT-2 "`gpt2`".
    #[strum(serialize = "gpt2")]
    Gpt2,

    /// GPT-3 "`r50k_base`".
    #[strum(serialize = "r50k_base")]
    R50kBase,

    /// Codex "`p50k_base`".
    #[strum(serialize = "p50k_base")]
    P50kBase,

    /// Edit models "`p50k_edit`".
    #[strum(serialize = "p50k_edit")]
    P50kEdit,

    /// GPT-3.5 / GPT-4 "`cl100k_base`".
    #[strum(serialize = "cl100k_base")]
    Cl100kBase,

    /// GPT-4o and later "`o200k_base`".
    #[strum(serialize = "o200k_base")]
    O200kBase,

    /// gpt-oss "`o200k_harmony`".
    #[strum(serialize = "o200k_harmony")]
    O200kHarmony,
}

/// The vocabulary used for unrecognized model names.
pub const DEFAULT_VOCABULARY: Vocabulary = Vocabulary::O200kBase;

impl From<Tokenizer> for Vocabulary {
    fn from(tokenizer: Tokenizer) -> Self {
        match tokenizer {
            Tokenizer::Gpt2 => Vocabulary::Gpt2,
            Tokenizer::R50kBase => Vocabulary::R50kBase,
            Tokenizer::P50kBase => Vocabulary::P50kBase,
            Tokenizer::P50kEdit => Vocabulary::P50kEdit,
            Tokenizer::Cl100kBase => Vocabulary::Cl100kBase,
            Tokenizer::O200kBase => Vocabulary::O200kBase,
            Tokenizer::O200kHarmony => Vocabulary::O200kHarmony,
        }
    }
}

impl From<Vocabulary> for Tokenizer {
    fn from(vocabulary: Vocabulary) -> Self {
        match vocabulary {
            Vocabulary::Gpt2 => Tokenizer::Gpt2,
            Vocabulary::R50kBase => Tokenizer::R50kBase,
            Vocabulary::P50kBase => Tokenizer::P50kBase,
            Vocabulary::P50kEdit => Tokenizer::P50kEdit,
            Vocabulary::Cl100kBase => Tokenizer::Cl100kBase,
            Vocabulary::O200kBase => Tokenizer::O200kBase,
            Vocabulary::O200kHarmony => Tokenizer::O200kHarmony,
        }
    }
}

/// The outcome of [`resolve_vocabulary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VocabularyResolution {
    /// The selected vocabulary.
    pub vocabulary: Vocabulary,

    /// Was the model name unrecognized, selecting [`DEFAULT_VOCABULARY`]?
    pub fallback: bool,
}

/// Resolve a model (or vocabulary) name to a [`Vocabulary`].
///
/// Resolution order:
/// 1. a vocabulary name, e.g. `"cl100k_base"`;
/// 2. the `tiktoken-rs` model table, e.g. `"gpt-4o-mini"` or `"davinci-002"`;
/// 3. [`DEFAULT_VOCABULARY`], with `fallback` set.
pub fn resolve_vocabulary(model: &str) -> VocabularyResolution {
    let vocabulary = model
        .parse::<Vocabulary>()
        .ok()
        .or_else(|| get_tokenizer(model).map(Vocabulary::from));

    match vocabulary {
        Some(vocabulary) => VocabularyResolution {
            vocabulary,
            fallback: false,
        },
        None => VocabularyResolution {
            vocabulary: DEFAULT_VOCABULARY,
            fallback: true,
        },
    }
}

impl Vocabulary {
    /// Construct the BPE encoder for this vocabulary.
    ///
    /// The vocabulary data is bundled with `tiktoken-rs`; nothing is downloaded.
    pub fn load_bpe(&self) -> TCResult<CoreBPE> {
        tiktoken_rs::get_bpe_from_tokenizer(Tokenizer::from(*self))
            .map_err(|err| TokencountError::Vocabulary(format!("{self}: {err}")))
    }

    /// Construct a [`TiktokenCounter`] for this vocabulary.
    pub fn load_counter(&self) -> TCResult<TiktokenCounter> {
        Ok(TiktokenCounter::new(*self, Arc::new(self.load_bpe()?)))
    }
}

/// [`TokenCounter`] over a shared, immutable `tiktoken-rs` encoder.
///
/// Text which spells a special token is encoded as ordinary text.
#[derive(Clone)]
pub struct TiktokenCounter {
    vocabulary: Vocabulary,
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}

impl TiktokenCounter {
    /// Wrap an encoder.
    pub fn new(
        vocabulary: Vocabulary,
        bpe: Arc<CoreBPE>,
    ) -> Self {
        Self { vocabulary, bpe }
    }

    /// The vocabulary.
    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Encode `text` to token ids.
    pub fn encode(
        &self,
        text: &str,
    ) -> Vec<Rank> {
        self.bpe.encode_ordinary(text)
    }
}

impl TokenCounter for TiktokenCounter {
    fn count_tokens(
        &self,
        text: &str,
    ) -> usize {
        self.encode(text).len()
    }
}
