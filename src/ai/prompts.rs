//! Prompt builders for the Gemini operations
//!
//! All instructions are in Spanish, matching the documents the detector
//! battery is tuned for. The JSON shapes requested here are the exact wire
//! shapes in [`crate::types`].

use crate::types::{AnalysisResult, ChatMessage, ChatRole, ComparisonResult};

/// Conversation history sent with a chat question is bounded to the most
/// recent messages to keep prompts inside the model context.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// System prompt for single-contract clause analysis
pub const ANALYSIS_PROMPT: &str = r#"Eres un abogado experto en derecho contractual con 20 años de experiencia protegiendo consumidores y trabajadores contra cláusulas abusivas. Tu trabajo es analizar contratos con ojo EXTREMADAMENTE CRÍTICO y escéptico. Tu misión es PROTEGER a quien firma, no justificar el contrato.

ANALIZA el PDF adjunto e identifica TODAS las cláusulas del contrato.

## CRITERIOS DE SEVERIDAD (sé estricto, ante la duda marca "warning" o "harmful"):

### "harmful" — Marca como HARMFUL si la cláusula:
- Permite penalizaciones económicas desproporcionadas o excesivas
- Impone permanencia obligatoria con penalización por salida anticipada
- Permite modificar condiciones unilateralmente (precio, términos, servicios)
- Renuncia a derechos legales del firmante (demandas, reclamaciones, garantías)
- Incluye cláusulas de confidencialidad que impiden denunciar abusos
- Permite terminación unilateral sin compensación solo a favor de una parte
- Establece jurisdicción o arbitraje que dificulte reclamar al firmante
- Incluye cesión de propiedad intelectual excesiva o permanente
- Permite recopilar o compartir datos personales sin límites claros
- Contiene renovación automática sin aviso claro o con periodo de cancelación irrazonable
- Limita o elimina la responsabilidad de una parte por daños o incumplimiento
- Exige exclusividad desproporcionada
- Contiene letra pequeña que contradice las condiciones principales
- Impone obligaciones desproporcionadas al firmante vs. la otra parte

### "warning" — Marca como WARNING si la cláusula:
- Es ambigua o vaga y podría interpretarse en contra del firmante
- Establece plazos o condiciones que podrían ser problemáticos
- Incluye condiciones que son legales pero inusuales o poco favorables
- Tiene lenguaje confuso que dificulta entender las obligaciones reales
- Otorga permisos amplios pero no ilimitados
- Establece limitaciones que podrían ser razonables pero merecen atención

### "safe" — Marca como SAFE SOLO si la cláusula:
- Es estándar, equilibrada y no genera ninguna preocupación
- Protege derechos de ambas partes de forma equitativa
- Es clara, directa y sin ambigüedades

## REGLA CLAVE: Cuando tengas duda entre dos niveles, SIEMPRE elige el nivel más severo. Es mejor alertar de más que de menos.

Para CADA cláusula devuelve:
- "number": número secuencial (entero)
- "title": título corto descriptivo
- "summary": resumen en lenguaje sencillo de qué significa para quien firma (1-2 oraciones)
- "severity": "safe", "warning" o "harmful"
- "explanation": explicación detallada de por qué asignaste esa severidad, mencionando el riesgo concreto para el firmante
- "textSnippets": un array de 1 a 3 fragmentos de texto EXACTOS copiados literalmente del contrato PDF que corresponden a esta cláusula. Cada fragmento debe tener entre 5 y 15 palabras consecutivas tal como aparecen en el documento original, sin modificar mayúsculas, acentos ni puntuación. Estos fragmentos se usarán para localizar y resaltar la cláusula en el PDF.

También devuelve:
- "verdict": "harmful" si CUALQUIER cláusula es "harmful", "safe" solo si NINGUNA lo es
- "verdictSummary": resumen de 1-2 oraciones sobre la equidad general del contrato y los principales riesgos encontrados

RESPONDE ÚNICAMENTE con JSON válido, sin markdown ni texto adicional:
{
  "clauses": [
    {
      "number": 1,
      "title": "string",
      "summary": "string",
      "severity": "safe" | "warning" | "harmful",
      "explanation": "string",
      "textSnippets": ["fragmento exacto del contrato"]
    }
  ],
  "verdict": "safe" | "harmful",
  "verdictSummary": "string"
}"#;

/// Prompt for the is-this-a-contract pre-check
pub const VALIDATION_PROMPT: &str = r#"Eres un clasificador de documentos legales. Examina el PDF adjunto y determina si es un CONTRATO (un acuerdo legal entre partes con obligaciones: contrato de trabajo, alquiler, servicios, compraventa, préstamo, suscripción, etc.).

NO son contratos: facturas, recibos, nóminas, currículums, presentaciones, informes, manuales, cartas, formularios sin obligaciones entre partes.

RESPONDE ÚNICAMENTE con JSON válido, sin markdown ni texto adicional:
{
  "isContract": true | false,
  "confidence": 0.0-1.0,
  "documentType": "tipo de documento detectado en español (por ejemplo: contrato de alquiler, factura, currículum)",
  "reason": "explicación breve de 1-2 oraciones de la clasificación"
}"#;

/// Prompt for side-by-side comparison of two contracts
pub const COMPARISON_PROMPT: &str = r#"Eres un abogado experto en derecho contractual con 20 años de experiencia protegiendo consumidores y trabajadores contra cláusulas abusivas. Se adjuntan DOS contratos, etiquetados CONTRATO 1 y CONTRATO 2.

TAREA:
1. Analiza cada contrato por separado con ojo EXTREMADAMENTE CRÍTICO: identifica todas sus cláusulas con número, título, resumen, severidad ("safe", "warning" o "harmful"), explicación y de 1 a 3 "textSnippets" (fragmentos EXACTOS de 5 a 15 palabras copiados literalmente del PDF correspondiente).
2. Para cada contrato devuelve también "verdict" ("harmful" si CUALQUIER cláusula es harmful, "safe" solo si ninguna lo es) y "verdictSummary" (1-2 oraciones).
3. Compara ambos contratos: indica cuál conviene más a quien firma ("contract1", "contract2" o "similar" si están igualados), por qué, y las diferencias clave entre ellos.

RESPONDE ÚNICAMENTE con JSON válido, sin markdown ni texto adicional:
{
  "contract1Analysis": { "clauses": [...], "verdict": "safe" | "harmful", "verdictSummary": "string" },
  "contract2Analysis": { "clauses": [...], "verdict": "safe" | "harmful", "verdictSummary": "string" },
  "recommendation": "contract1" | "contract2" | "similar",
  "recommendationReason": "string",
  "keyDifferences": [
    {
      "aspect": "qué se compara (duración, penalizaciones, pagos...)",
      "contract1": "cómo lo trata el contrato 1",
      "contract2": "cómo lo trata el contrato 2",
      "favoredContract": "contract1" | "contract2" | "equal"
    }
  ],
  "overallSummary": "string"
}"#;

/// Build the prompt for a follow-up question about one analyzed contract.
///
/// Grounds the model in the extracted contract text and the prior analysis;
/// only the last [`MAX_HISTORY_MESSAGES`] of conversation are included.
pub fn build_chat_prompt(
    question: &str,
    contract_text: &str,
    analysis: &AnalysisResult,
    history: &[ChatMessage],
) -> String {
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Eres un abogado experto en derecho contractual que ya analizó el contrato del usuario. \
Responde sus preguntas sobre ese contrato en español, de forma clara, directa y en lenguaje \
sencillo. Básate ÚNICAMENTE en el texto del contrato y en el análisis previo; si algo no \
aparece en ellos, dilo honestamente. No inventes cláusulas ni condiciones.\n\n\
TEXTO DEL CONTRATO:\n{contract_text}\n\n\
ANÁLISIS PREVIO (JSON):\n{analysis_json}\n\n\
{history}PREGUNTA DEL USUARIO:\n{question}",
        history = render_history(history),
    )
}

/// Build the prompt for a follow-up question about a comparison of two
/// contracts.
pub fn build_comparison_chat_prompt(
    question: &str,
    contract1_text: &str,
    contract2_text: &str,
    comparison: &ComparisonResult,
    history: &[ChatMessage],
) -> String {
    let comparison_json =
        serde_json::to_string_pretty(comparison).unwrap_or_else(|_| "{}".to_string());

    format!(
        "Eres un abogado experto en derecho contractual que ya comparó los dos contratos del \
usuario. Responde sus preguntas sobre la comparación en español, de forma clara y concisa. \
Básate ÚNICAMENTE en el texto de ambos contratos y en la comparación previa; si algo no \
aparece en ellos, dilo honestamente.\n\n\
CONTRATO 1:\n{contract1_text}\n\n\
CONTRATO 2:\n{contract2_text}\n\n\
COMPARACIÓN PREVIA (JSON):\n{comparison_json}\n\n\
{history}PREGUNTA DEL USUARIO:\n{question}",
        history = render_history(history),
    )
}

fn render_history(history: &[ChatMessage]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let lines: Vec<String> = history[start..]
        .iter()
        .map(|message| {
            let speaker = match message.role {
                ChatRole::User => "Usuario",
                ChatRole::Assistant => "Asistente",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect();

    format!("CONVERSACIÓN PREVIA:\n{}\n\n", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verdict;

    fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            clauses: vec![],
            verdict: Verdict::Safe,
            verdict_summary: "Contrato equilibrado".to_string(),
        }
    }

    #[test]
    fn test_chat_prompt_grounds_in_text_and_analysis() {
        let prompt = build_chat_prompt(
            "¿Puedo cancelar sin penalización?",
            "Cláusula 4: permanencia de 12 meses.",
            &sample_analysis(),
            &[],
        );
        assert!(prompt.contains("Cláusula 4: permanencia de 12 meses."));
        assert!(prompt.contains("Contrato equilibrado"));
        assert!(prompt.ends_with("¿Puedo cancelar sin penalización?"));
        assert!(!prompt.contains("CONVERSACIÓN PREVIA"));
    }

    #[test]
    fn test_chat_prompt_bounds_history() {
        let history: Vec<ChatMessage> = (0..15)
            .map(|i| ChatMessage::user(format!("pregunta {i}")))
            .collect();
        let prompt = build_chat_prompt("última", "texto", &sample_analysis(), &history);

        // Only the 10 most recent messages survive
        assert!(!prompt.contains("pregunta 4"));
        assert!(prompt.contains("pregunta 5"));
        assert!(prompt.contains("pregunta 14"));
    }

    #[test]
    fn test_history_renders_both_roles() {
        let history = vec![
            ChatMessage::user("¿Es abusiva la cláusula 2?"),
            ChatMessage::assistant("Sí, limita tus derechos."),
        ];
        let rendered = render_history(&history);
        assert!(rendered.contains("Usuario: ¿Es abusiva la cláusula 2?"));
        assert!(rendered.contains("Asistente: Sí, limita tus derechos."));
    }

    #[test]
    fn test_analysis_prompt_requests_exact_json_shape() {
        assert!(ANALYSIS_PROMPT.contains("\"textSnippets\""));
        assert!(ANALYSIS_PROMPT.contains("\"verdictSummary\""));
        assert!(VALIDATION_PROMPT.contains("\"isContract\""));
        assert!(COMPARISON_PROMPT.contains("\"keyDifferences\""));
    }
}
