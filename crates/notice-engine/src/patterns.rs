//! Named pattern tables for Brazilian judicial-notice conventions
//!
//! Keyword tables are grouped by the ruleset revision that introduced them;
//! [`crate::ruleset::Ruleset::preset`] stacks them. Regexes are compiled once.

use lazy_static::lazy_static;
use regex::Regex;

/// Role markers as `(label, role)`. `None` marks the generic party list.
pub const ROLE_MARKERS_BASE: &[(&str, Option<&str>)] =
    &[("Parte(s):", None), ("Advogado(s)", Some("advogado"))];

/// Appeal roles
pub const ROLE_MARKERS_APPEAL: &[(&str, Option<&str>)] = &[
    ("Apelante:", Some("apelante")),
    ("Apelantes:", Some("apelante")),
    ("Apelado:", Some("apelado")),
    ("Apelada:", Some("apelado")),
    ("Apelados:", Some("apelado")),
    ("Agravante:", Some("agravante")),
    ("Agravado:", Some("agravado")),
    ("Agravada:", Some("agravado")),
    ("Recorrente:", Some("recorrente")),
    ("Recorrido:", Some("recorrido")),
    ("Recorrida:", Some("recorrido")),
];

/// First-instance roles
pub const ROLE_MARKERS_TRIAL: &[(&str, Option<&str>)] = &[
    ("Partes:", None),
    ("Autor:", Some("autor")),
    ("Autora:", Some("autor")),
    ("Réu:", Some("reu")),
    ("Ré:", Some("reu")),
    ("Requerente:", Some("requerente")),
    ("Requerido:", Some("requerido")),
    ("Requerida:", Some("requerido")),
    ("Exequente:", Some("exequente")),
    ("Executado:", Some("executado")),
    ("Executada:", Some("executado")),
    ("Advogado:", Some("advogado")),
    ("Advogada:", Some("advogado")),
    ("Advogados:", Some("advogado")),
];

/// Less frequent roles
pub const ROLE_MARKERS_EXTENDED: &[(&str, Option<&str>)] = &[
    ("Embargante:", Some("embargante")),
    ("Embargado:", Some("embargado")),
    ("Impetrante:", Some("impetrante")),
    ("Impetrado:", Some("impetrado")),
    ("Reclamante:", Some("reclamante")),
    ("Reclamado:", Some("reclamado")),
    ("Reclamada:", Some("reclamado")),
    ("Interessado:", Some("interessado")),
    ("Interessada:", Some("interessado")),
    ("Terceiro:", Some("terceiro")),
];

/// Stop-tokens that close a marker window. Role marker labels are added on top.
pub const STOP_TOKENS_BASE: &[&str] = &[
    "Advogado(s)",
    "Intimação",
    "Processo:",
    "Publ.",
    "Certifico",
];

pub const STOP_TOKENS_EXTENDED: &[&str] = &[
    "OAB",
    "Processo",
    "Intimado",
    "Intimada",
    "Vara",
    "Foro",
    "Comarca",
    "Tribunal",
    "Relator:",
    "Relatora:",
    "Juiz",
    "Juíza",
    "Classe:",
    "Assunto:",
    "Data da Disponibilização",
    "Data de Publicação",
    "Disponibilização:",
    "Sentença",
    "Despacho",
    "Decisão",
    "Acórdão",
    "Vistos",
];

/// Suffixes that end a corporate name
pub const CORPORATE_SUFFIXES_BASE: &[&str] = &[
    "LTDA", "LTDA.", "LIMITADA", "S.A.", "S.A", "S/A", "EIRELI",
];

/// Microenterprise, law-firm and investment-fund suffixes
pub const CORPORATE_SUFFIXES_EXTENDED: &[&str] = &[
    "ME",
    "EPP",
    "S/C",
    "INC",
    "INC.",
    "LLC",
    "ADVOGADOS",
    "ADVOGADOS ASSOCIADOS",
    "SOCIEDADE DE ADVOGADOS",
    "SOCIEDADE INDIVIDUAL DE ADVOCACIA",
    "FIDC",
    "FII",
    "FIP",
    "NÃO PADRONIZADOS",
    "MULTISSETORIAL",
];

/// Tokens after a suffix that still belong to the same name
pub const EXCEPTION_SUFFIXES: &[&str] = &[
    "ME",
    "EPP",
    "EIRELI",
    "EM RECUPERAÇÃO JUDICIAL",
    "EM LIQUIDAÇÃO",
    "EM LIQUIDAÇÃO EXTRAJUDICIAL",
    "CRÉDITO",
    "CRÉDITO, FINANCIAMENTO E INVESTIMENTO",
    "ARRENDAMENTO MERCANTIL",
];

/// Institutional names frequently listed back-to-back with other parties
pub const INSTITUTIONAL_TOKENS: &[&str] = &[
    "MINISTÉRIO PÚBLICO DO ESTADO DE SÃO PAULO",
    "MINISTÉRIO PÚBLICO FEDERAL",
    "MINISTÉRIO PÚBLICO",
    "DEFENSORIA PÚBLICA DO ESTADO DE SÃO PAULO",
    "DEFENSORIA PÚBLICA DA UNIÃO",
    "FAZENDA PÚBLICA DO ESTADO DE SÃO PAULO",
    "FAZENDA DO ESTADO DE SÃO PAULO",
    "FAZENDA NACIONAL",
    "UNIÃO FEDERAL",
    "INSTITUTO NACIONAL DO SEGURO SOCIAL - INSS",
    "INSTITUTO NACIONAL DO SEGURO SOCIAL",
    "CAIXA ECONÔMICA FEDERAL",
    "MUNICÍPIO DE SÃO PAULO",
];

/// Words that separate adversarial parties inside one list
pub const SPLIT_CONNECTORS: &[&str] = &["X", "VS", "VS.", "VERSUS"];

/// Slash abbreviations that must not be treated as alternatives
pub const PROTECTED_SLASH_ABBREVIATIONS: &[&str] = &["S/A", "S/C"];

/// Boilerplate stripped from the tail of a split piece
pub const TAIL_BOILERPLATE: &[&str] = &[
    "EM RECUPERAÇÃO JUDICIAL",
    "EM LIQUIDAÇÃO EXTRAJUDICIAL",
    "EM LIQUIDAÇÃO",
    "MASSA FALIDA",
    "E OUTROS",
    "E OUTRO",
    "E OUTRAS",
    "E OUTRA",
];

/// Openers of trailing representative parentheticals, e.g. "(REPRESENTADO POR ...)"
pub const REPRESENTATIVE_CLAUSES: &[&str] = &[
    "REPRESENTAD",
    "ASSISTID",
    "POR SEU",
    "POR SUA",
    "NA PESSOA",
    "CURADOR",
];

/// Connectors and prepositions that cannot open a name
pub const SYNTAX_GUARD_WORDS: &[&str] = &[
    "de", "da", "do", "das", "dos", "e", "a", "o", "as", "os", "em", "no", "na", "nos", "nas",
    "ao", "aos", "à", "às", "que", "para", "por", "pelo", "pela", "com", "se", "ou",
];

/// Court names and docket boilerplate
pub const BLOCKLIST_BASE: &[&str] = &[
    "PODER JUDICIÁRIO",
    "TRIBUNAL DE JUSTIÇA",
    "SUPERIOR TRIBUNAL",
    "SUPREMO TRIBUNAL",
    "TRIBUNAL REGIONAL",
    "JUSTIÇA FEDERAL",
    "JUSTIÇA DO TRABALHO",
    "JUIZADO ESPECIAL",
    "TURMA RECURSAL",
    "SEÇÃO JUDICIÁRIA",
    "VARA",
    "FORO",
    "COMARCA",
    "CARTÓRIO",
    "DIÁRIO DA JUSTIÇA",
    "DIÁRIO OFICIAL",
    "DISPONIBILIZAÇÃO",
    "INTIMAÇÃO",
    "PROCESSO",
];

/// Procedural role labels and docket vocabulary
pub const BLOCKLIST_PROCEDURAL: &[&str] = &[
    "CITAÇÃO",
    "EDITAL",
    "AUTOS",
    "CLASSE",
    "ASSUNTO",
    "VALOR DA CAUSA",
    "SEGREDO DE JUSTIÇA",
    "JUSTIÇA GRATUITA",
    "ASSISTÊNCIA JUDICIÁRIA",
    "CUMPRIMENTO DE SENTENÇA",
    "PROCEDIMENTO COMUM",
    "EXECUÇÃO DE TÍTULO",
    "PARTE(S)",
    "ADVOGADO(S)",
    "APELANTE",
    "APELADO",
    "AGRAVANTE",
    "AGRAVADO",
    "REQUERENTE",
    "REQUERIDO",
    "EXEQUENTE",
    "EXECUTADO",
    "EMBARGANTE",
    "EMBARGADO",
    "IMPETRANTE",
    "IMPETRADO",
    "RECORRENTE",
    "RECORRIDO",
    "RELATOR",
    "RELATORA",
    "REVISOR",
    "JUIZ DE DIREITO",
    "JUÍZA DE DIREITO",
    "DESEMBARGADOR",
    "DESEMBARGADORA",
    "ESCRIVÃO",
    "ESCRIVÃ",
    "DIRETOR DE SECRETARIA",
];

/// Judgment and order boilerplate
pub const BLOCKLIST_JUDGMENT: &[&str] = &[
    "JULGO PROCEDENTE",
    "JULGO IMPROCEDENTE",
    "JULGO EXTINTO",
    "HOMOLOGO",
    "TRÂNSITO EM JULGADO",
    "NOS TERMOS DO ART",
    "NOS TERMOS DO ARTIGO",
    "FICA INTIMADO",
    "FICA INTIMADA",
    "FICAM INTIMADOS",
    "FICAM AS PARTES",
    "MANIFESTE-SE",
    "CUMPRA-SE",
    "INTIME-SE",
    "PUBLIQUE-SE",
    "CUSTAS",
    "HONORÁRIOS",
    "VISTOS",
    "DESPACHO",
    "SENTENÇA",
    "DECISÃO",
    "ACÓRDÃO",
];

/// Abusive terms quoted from the case record
pub const BLOCKLIST_CASE_SPECIFIC: &[&str] = &["CALOTEIRO", "ESTELIONATÁRIO", "VAGABUNDO"];

/// Bare labels rejected on exact match
pub const HEADER_LABELS: &[&str] = &[
    "OAB",
    "ADVOGADO",
    "ADVOGADA",
    "ADVOGADOS",
    "ADVOGADO(S)",
    "PARTE",
    "PARTES",
    "PARTE(S)",
    "AUTOR",
    "AUTORA",
    "RÉU",
    "RÉ",
    "REQUERENTE",
    "REQUERIDO",
    "REQUERIDA",
    "APELANTE",
    "APELADO",
    "AGRAVANTE",
    "AGRAVADO",
    "EXEQUENTE",
    "EXECUTADO",
    "INTERESSADO",
    "INTERESSADA",
    "PROCESSO",
    "RELATOR",
    "RELATORA",
    "VISTOS",
    "DESPACHO",
    "SENTENÇA",
    "DECISÃO",
];

/// Tokens the normalizer keeps apart from the preceding word
pub const KEYWORD_SEPARATORS: &[&str] = &["OAB", "Processo", "Intimação", "Publ.", "Certifico"];

lazy_static! {
    /// Numbered entry that opens a publication: "12. PROCESSO ..."
    pub static ref ENTRY_START: Regex = Regex::new(r"^\d+\.\s*\p{Lu}").unwrap();

    /// Leading list index: "1. ", "2- ", "3) "
    pub static ref LEADING_INDEX: Regex = Regex::new(r"^\d+\s*[.\-)–]\s").unwrap();

    /// Bare two-letter acronym: "SP", "S.A.", "S/A"
    pub static ref BARE_ACRONYM: Regex = Regex::new(r"^\p{L}[./]?\s?\p{L}\.?$").unwrap();

    /// Full date phrase: "10 DE MARÇO DE 2023"
    pub static ref DATE_PHRASE: Regex = Regex::new(
        r"(?i)\b\d{1,2}º?\s+DE\s+(?:JANEIRO|FEVEREIRO|MAR[ÇC]O|ABRIL|MAIO|JUNHO|JULHO|AGOSTO|SETEMBRO|OUTUBRO|NOVEMBRO|DEZEMBRO)\s+DE\s+\d{4}\b"
    )
    .unwrap();

    /// Attorney registration: "OAB SP-123456", "OAB: 12345", "SP123456"
    pub static ref ATTORNEY_REGISTRATION: Regex = Regex::new(
        r"(?:\b(?i:OAB)\b\s*[:/\-.]?\s*(?:(?i:n)[º°o.]*\s*)?(?:[A-Z]{2}\s*[-/]?\s*)?\d{3,}|\b[A-Z]{2}[-/]?\d{4,}\b)"
    )
    .unwrap();

    /// Document id reference closing an attorney list: "ID 12345"
    pub static ref DOCUMENT_ID: Regex = Regex::new(r"\bID\s+\d+").unwrap();

    /// CNJ unified numbering: NNNNNNN-DD.AAAA.J.TR.OOOO with optional "/NNNN"
    pub static ref CNJ_NUMBER: Regex = Regex::new(
        r"\b\d{7}[\s.\-]?\d{2}[\s.]?\d{4}[\s.]?\d[\s.]?\d{2}[\s.]?\d{4}(?:/\d{1,4})?\b"
    )
    .unwrap();

    /// Legacy appeal numbering: 1.0000.24.175224-5/004
    pub static ref LEGACY_NUMBER: Regex = Regex::new(r"\b\d[\d.]+-\d/\d{3,4}\b").unwrap();

    /// OCR-damaged numbers: a bare run of 15 to 25 digits
    pub static ref LONG_DIGIT_RUN: Regex = Regex::new(r"\b\d{15,25}\b").unwrap();
}

/// Uppercase and strip Portuguese diacritics, for accent-insensitive lookups
pub fn fold_key(text: &str) -> String {
    text.chars()
        .flat_map(char::to_uppercase)
        .map(|c| match c {
            'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'Ç' => 'C',
            other => other,
        })
        .collect()
}

/// True when `phrase` occurs in `haystack` with no letter or digit glued to
/// either edge. Both arguments are expected to be folded with [`fold_key`].
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let glued_start = phrase.chars().next().is_some_and(char::is_alphanumeric);
    let glued_end = phrase.chars().last().is_some_and(char::is_alphanumeric);

    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok =
            !glued_start || !haystack[..start].chars().last().is_some_and(char::is_alphanumeric);
        let after_ok =
            !glued_end || !haystack[end..].chars().next().is_some_and(char::is_alphanumeric);
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_key_strips_accents_and_case() {
        assert_eq!(fold_key("Poder Judiciário"), "PODER JUDICIARIO");
        assert_eq!(fold_key("ação"), "ACAO");
    }

    #[test]
    fn test_contains_phrase_respects_word_edges() {
        assert!(contains_phrase("AUTOS N. 123", "AUTOS"));
        assert!(!contains_phrase("AUTOSERVICO LTDA", "AUTOS"));
        assert!(contains_phrase("VER PARTE(S)", "PARTE(S)"));
        assert!(!contains_phrase("SANTA VARANDA", "VARA"));
    }

    #[test]
    fn test_entry_start_requires_uppercase_after_period() {
        assert!(ENTRY_START.is_match("12. PROCESSO 0001234"));
        assert!(ENTRY_START.is_match("3.Intimação"));
        assert!(!ENTRY_START.is_match("1.5 metros"));
        assert!(!ENTRY_START.is_match("Processo 1. A"));
    }

    #[test]
    fn test_attorney_registration_variants() {
        assert!(ATTORNEY_REGISTRATION.is_match("OAB SP-123456"));
        assert!(ATTORNEY_REGISTRATION.is_match("OAB: 12345"));
        assert!(ATTORNEY_REGISTRATION.is_match("OAB/SP 123.456"));
        assert!(ATTORNEY_REGISTRATION.is_match("RJ123456"));
        assert!(!ATTORNEY_REGISTRATION.is_match("10 DE MARÇO DE 2023"));
        assert!(!ATTORNEY_REGISTRATION.is_match("BANCO DO BRASIL S.A."));
    }

    #[test]
    fn test_date_phrase_is_case_insensitive() {
        assert!(DATE_PHRASE.is_match("São Paulo, 10 de março de 2023"));
        assert!(DATE_PHRASE.is_match("1º DE JANEIRO DE 2024"));
        assert!(!DATE_PHRASE.is_match("MARÇO DE 2023"));
    }
}
