//! Prompt templates and fixed user-facing texts.

pub const INSUFFICIENT_CONTEXT_NOTICE: &str =
	"Contextual data from the document corpus was insufficient to fully support this answer.";
pub const RETRIEVAL_FAILED_ANSWER: &str =
	"No answer was produced because document retrieval was unavailable for this question.";
pub const GENERATION_FAILED_ANSWER: &str =
	"No answer was produced because the language model was unavailable for this question.";

pub fn routing_prompt(question: &str) -> String {
	format!(
		"Classify if the following question requires LOOKUP in the provided document corpus or \
can be answered DIRECTLY from general knowledge.\n\n\
Answer with a single uppercase token: LOOKUP or DIRECT.\n\n\
Question: \"{question}\"\n"
	)
}

pub fn answer_prompt(question: &str, context: &str) -> String {
	format!(
		"You are an expert assistant. Use the provided context (if any) to answer the question.\n\
Cite context inline as [source - page] if used.\n\
If context is missing or insufficient, answer with your general knowledge\n\
and indicate clearly that context data from the documents is insufficient.\n\n\
Question:\n{question}\n\n\
Context:\n{context}\n\n\
Answer concisely with citations if possible.\n"
	)
}

pub fn judgment_prompt(question: &str, answer: &str) -> String {
	format!(
		"You are reviewing a Q&A system output.\n\n\
Question: {question}\n\
Answer: {answer}\n\n\
Decide if the answer is insufficient due to missing context (not enough document info).\n\
Respond with only YES (retry with improved query) or NO (stop).\n"
	)
}

pub fn reformulation_prompt(question: &str) -> String {
	format!(
		"Rewrite the following question as an improved search query to maximize recall in a \
vector database.\n\
Include likely synonyms, abbreviations, German/English variants.\n\
Return only the improved query.\n\n\
Original: {question}\n"
	)
}

/// Appends the insufficiency notice as its own paragraph.
pub fn with_insufficiency_notice(answer: &str) -> String {
	let trimmed = answer.trim_end();

	if trimmed.is_empty() {
		INSUFFICIENT_CONTEXT_NOTICE.to_string()
	} else {
		format!("{trimmed}\n\n{INSUFFICIENT_CONTEXT_NOTICE}")
	}
}
