use chrono::NaiveDate;
use serde::Serialize;

/// Renders the instruction sent to the model for a Portuguese payment
/// receipt. `today` fills in whatever parts of the date the receipt omits.
pub fn build_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        r#"
<text>
  {text}
</text>
The text above is extracted from a payment receipt in Portuguese. Be concise to avoid errors.
Today's date is {today}.
Extract the following structured information:

1. The amount paid (value) with discount if mentioned
2. The payment date
3. The institution that received the payment (the payee)
  - This is found normally in the "Destino", "nome Favorecido" section
  - Look specifically for the entity name after "Nome" in the "Destino" section
  - The institution is the entity receiving the payment (not the bank handling the transaction)
  - Common examples include utility companies, government agencies, service providers, etc. (not the bank itself)

  Respond ONLY with a JSON object in the following format:

{{
  "amount": [the amount as a float number],
  "payment_date": "[yyyy-mm-dd, if it doesnt have a year or the full date, use the current year, month and day if necessary]",
  "institution": "[full name of the recipient entity]"
}}
"#,
        text = text,
        today = today.format("%Y-%m-%d"),
    )
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Chat-completion body understood by the OpenAI-compatible models on
/// Bedrock.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> ChatRequest<'a> {
    pub fn user(prompt: &'a str, max_tokens: u32, temperature: f32) -> Self {
        ChatRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn prompt_embeds_text_and_date() {
        let prompt = build_prompt("PIX Destino Nome ACME R$ 50,00", today());

        assert!(prompt.contains("<text>\n  PIX Destino Nome ACME R$ 50,00\n</text>"));
        assert!(prompt.contains("Today's date is 2024-03-15."));
        assert!(prompt.contains("\"payment_date\": \"[yyyy-mm-dd"));
        assert!(prompt.contains("Respond ONLY with a JSON object"));
    }

    #[test]
    fn chat_request_shape() {
        let request = ChatRequest::user("hello", 512, 0.1);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
        assert_eq!(value["max_tokens"], 512);
        assert!((value["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }
}
