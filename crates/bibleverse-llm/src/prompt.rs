//! Prompt templates for verse generation

/// Prompt templates shared by all providers
pub struct VersePrompts;

impl VersePrompts {
    /// Persona the model should adopt
    pub const PERSONA: &'static str = "당신은 성경에 정통한 목회 상담가입니다. 사용자의 상황에 맞는 성경 구절을 찾아주고, 그 의미를 자세히 설명해주세요. 매번 다양한 구절을 추천하세요.";

    /// Task description and the JSON shape the model must answer with
    pub fn instructions(situation: &str) -> String {
        format!(
            r#"사용자가 "{situation}" 상황에 있습니다.

이 상황에 가장 적합한 성경 구절 하나를 찾아주세요. 매번 다른 구절을 추천해주세요.

다음 정보를 JSON 형식으로만 제공해주세요:

{{
  "reference": "책 장:절 (예: 시편 23:1)",
  "text": "성경 구절 원문 (한글, 완전한 문장)",
  "context": "이 구절이 나온 성경의 앞뒤 문맥과 배경을 자세히 설명 (최소 3-4 문장)",
  "meaning": "이 구절이 현재 상황에 어떻게 적용되는지 구체적으로 설명 (최소 3-4 문장)",
  "prayer": "이 말씀을 바탕으로 한 진심어린 기도문 (최소 2-3 문장)"
}}

JSON만 응답하고 다른 설명은 하지 마세요. 백틱이나 마크다운 형식도 사용하지 마세요."#
        )
    }

    /// Persona and instructions as a single user turn
    pub fn combined(situation: &str) -> String {
        format!("{}\n\n{}", Self::PERSONA, Self::instructions(situation))
    }

    /// Mistral instruction format used by the Hugging Face text-generation models
    pub fn mistral_instruct(situation: &str) -> String {
        format!("<s>[INST] {} [/INST]", Self::combined(situation))
    }
}
