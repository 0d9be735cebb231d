//! Prompt construction

/// Instructions sent as the system message of every call
pub const SYSTEM_PROMPT: &str = r#"You write vocabulary flashcards for a language learner.

For every word you are given, return one card. Reply with a single JSON object of the form
{"items": [ ... ]} and nothing else. Each item has these fields:

- "word": the word exactly as given
- "canonicalAnswer": the most common meaning in one to three words
- "alternateAnswer": another accepted answer, or omit the field
- "partOfSpeech": one of noun, verb, adj, adv, prep, pron, conj, det, interj, phrase
- "definition": a short learner-friendly definition
- "exampleSentence": a natural sentence using the word
- "sourceTitle": the book title you were given
- "hint": a clue that helps recall the answer

Never use the word itself, or any form of it, inside "definition" or "hint".
If a word is a proper noun or you do not know it, leave it out of "items"."#;

/// User message listing the batch
pub fn user_prompt(words: &[String], source_title: &str) -> String {
    let mut prompt = format!(
        "Book: {source_title}\nWrite cards for these {} words:\n",
        words.len()
    );
    for word in words {
        prompt.push_str("- ");
        prompt.push_str(word);
        prompt.push('\n');
    }
    prompt
}
