// src/services/sequence.rs

// Formatação dos identificadores sequenciais legíveis por humanos.
// A ALOCAÇÃO do valor é o UPSERT atômico em `db::billing_repo::allocate_sequence`;
// aqui é só a apresentação: "PREFIXO-ANO-NNN" e "ANO-NNNN".

/// "INV-2026-001", "CN-2026-042"... O preenchimento é de 3 dígitos, mas o
/// número cresce naturalmente além de 999.
pub fn format_document_number(prefix: &str, year: i32, value: i32) -> String {
    format!("{prefix}-{year}-{value:03}")
}

/// Número de aluno: "2026-0001" (4 dígitos, sem prefixo).
pub fn format_student_number(year: i32, value: i32) -> String {
    format!("{year}-{value:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numero_de_documento_preenche_tres_digitos() {
        assert_eq!(format_document_number("INV", 2026, 1), "INV-2026-001");
        assert_eq!(format_document_number("INV", 2026, 42), "INV-2026-042");
        assert_eq!(format_document_number("CN", 2025, 999), "CN-2025-999");
    }

    #[test]
    fn numero_de_documento_cresce_alem_do_preenchimento() {
        assert_eq!(format_document_number("INV", 2026, 1000), "INV-2026-1000");
    }

    #[test]
    fn numero_de_aluno_preenche_quatro_digitos_sem_prefixo() {
        assert_eq!(format_student_number(2026, 1), "2026-0001");
        assert_eq!(format_student_number(2026, 123), "2026-0123");
        assert_eq!(format_student_number(2026, 10000), "2026-10000");
    }
}
