// src/services/import_service.rs

use chrono::{Datelike, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{billing_repo::allocate_sequence, ClientRepository, StudentRepository},
    models::{
        clients::{Client, CreateClientPayload},
        students::{CreateStudentPayload, Student},
    },
    services::sequence::format_student_number,
};

// --- IMPORTAÇÃO CSV ---
// Importação é tudo-ou-nada: qualquer linha inválida aborta a transação
// inteira e NENHUMA linha é persistida. O cabeçalho define a ordem das
// colunas; colunas extras são ignoradas.

const STUDENT_COLUMNS: &[&str] = &[
    "first_name",
    "last_name",
    "grade",
    "language",
    "parent_name",
    "parent_contact",
];

const CLIENT_COLUMNS: &[&str] = &["name", "email", "phone", "currency", "payment_terms_days"];

/// Divide uma linha CSV respeitando aspas duplas ("" escapa a aspa).
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// Linhas do CSV como mapas coluna -> valor, na ordem do arquivo.
/// Retorna também o índice da linha original (para mensagens de erro).
fn parse_csv(content: &str) -> Result<(Vec<String>, Vec<(usize, Vec<String>)>), AppError> {
    let mut lines = content.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((_, line)) => {
                break split_csv_line(line)
                    .into_iter()
                    .map(|c| c.to_lowercase())
                    .collect::<Vec<String>>()
            }
            None => {
                return Err(AppError::CsvMissingColumns(
                    vec!["(arquivo vazio)".to_string()],
                ))
            }
        }
    };

    let mut rows = Vec::new();
    for (index, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        // Linhas CSV são 1-based para o usuário
        rows.push((index + 1, split_csv_line(line)));
    }

    Ok((header, rows))
}

/// Garante que todas as colunas obrigatórias estão no cabeçalho; o erro
/// nomeia TODAS as que faltam de uma vez.
fn check_required_columns(header: &[String], required: &[&str]) -> Result<(), AppError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|col| !header.iter().any(|h| h == *col))
        .map(|col| (*col).to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::CsvMissingColumns(missing))
    }
}

fn field<'a>(header: &[String], row: &'a [String], column: &str) -> Option<&'a str> {
    header
        .iter()
        .position(|h| h == column)
        .and_then(|i| row.get(i))
        .map(|v| v.as_str())
        .filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct ImportService {
    student_repo: StudentRepository,
    client_repo: ClientRepository,
}

impl ImportService {
    pub fn new(student_repo: StudentRepository, client_repo: ClientRepository) -> Self {
        Self {
            student_repo,
            client_repo,
        }
    }

    pub async fn import_students<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        content: &str,
    ) -> Result<Vec<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (header, rows) = parse_csv(content)?;
        check_required_columns(&header, STUDENT_COLUMNS)?;

        let mut tx = executor.begin().await?;
        let year = Utc::now().date_naive().year();

        let mut imported = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            let payload = student_payload(&header, &row, line)?;
            validator::Validate::validate(&payload).map_err(|_| AppError::CsvInvalidRow {
                line,
                reason: "campos inválidos".to_string(),
            })?;

            let value = allocate_sequence(&mut *tx, owner_id, "STUDENT", year).await?;
            let number = format_student_number(year, value);

            let student = self
                .student_repo
                .insert_student(&mut *tx, owner_id, &number, &payload)
                .await?;
            imported.push(student);
        }

        tx.commit().await?;

        tracing::info!("Importação: {} aluno(s) criados", imported.len());

        Ok(imported)
    }

    pub async fn import_clients<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        content: &str,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (header, rows) = parse_csv(content)?;
        check_required_columns(&header, CLIENT_COLUMNS)?;

        let mut tx = executor.begin().await?;

        let mut imported = Vec::with_capacity(rows.len());
        for (line, row) in rows {
            let payload = client_payload(&header, &row, line)?;
            validator::Validate::validate(&payload).map_err(|_| AppError::CsvInvalidRow {
                line,
                reason: "campos inválidos".to_string(),
            })?;

            let client = self
                .client_repo
                .create_client(&mut *tx, owner_id, &payload)
                .await?;
            imported.push(client);
        }

        tx.commit().await?;

        tracing::info!("Importação: {} cliente(s) criados", imported.len());

        Ok(imported)
    }
}

fn student_payload(
    header: &[String],
    row: &[String],
    line: usize,
) -> Result<CreateStudentPayload, AppError> {
    let first_name = field(header, row, "first_name")
        .ok_or_else(|| invalid_row(line, "first_name ausente"))?
        .to_string();
    let last_name = field(header, row, "last_name")
        .ok_or_else(|| invalid_row(line, "last_name ausente"))?
        .to_string();
    let grade: i16 = field(header, row, "grade")
        .ok_or_else(|| invalid_row(line, "grade ausente"))?
        .parse()
        .map_err(|_| invalid_row(line, "grade não é um número"))?;

    Ok(CreateStudentPayload {
        first_name,
        last_name,
        grade,
        language: field(header, row, "language").map(str::to_string),
        parent_name: field(header, row, "parent_name").map(str::to_string),
        parent_contact: field(header, row, "parent_contact").map(str::to_string),
    })
}

fn client_payload(
    header: &[String],
    row: &[String],
    line: usize,
) -> Result<CreateClientPayload, AppError> {
    let name = field(header, row, "name")
        .ok_or_else(|| invalid_row(line, "name ausente"))?
        .to_string();

    let payment_terms_days = match field(header, row, "payment_terms_days") {
        Some(raw) => Some(
            raw.parse::<i32>()
                .map_err(|_| invalid_row(line, "payment_terms_days não é um número"))?,
        ),
        None => None,
    };

    Ok(CreateClientPayload {
        name,
        email: field(header, row, "email").map(str::to_string),
        phone: field(header, row, "phone").map(str::to_string),
        address: None,
        currency: field(header, row, "currency").map(str::to_string),
        payment_terms_days,
    })
}

fn invalid_row(line: usize, reason: &str) -> AppError {
    AppError::CsvInvalidRow {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_campos_simples() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn respeita_aspas_com_virgula_dentro() {
        assert_eq!(
            split_csv_line(r#"Ana,"Silva, Souza",7"#),
            vec!["Ana", "Silva, Souza", "7"]
        );
    }

    #[test]
    fn aspas_duplas_escapam_a_aspa() {
        assert_eq!(
            split_csv_line(r#""Colégio ""Alfa""",BRL"#),
            vec![r#"Colégio "Alfa""#, "BRL"]
        );
    }

    #[test]
    fn cabecalho_incompleto_nomeia_todas_as_colunas_faltantes() {
        let header: Vec<String> = vec!["first_name".to_string(), "grade".to_string()];
        let err = check_required_columns(&header, STUDENT_COLUMNS).unwrap_err();

        match err {
            AppError::CsvMissingColumns(missing) => {
                assert!(missing.contains(&"last_name".to_string()));
                assert!(missing.contains(&"language".to_string()));
                assert!(missing.contains(&"parent_name".to_string()));
                assert!(missing.contains(&"parent_contact".to_string()));
                assert!(!missing.contains(&"first_name".to_string()));
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn parse_ignora_linhas_vazias_e_normaliza_o_cabecalho() {
        let content = "First_Name,Last_Name,Grade\n\nAna,Silva,7\n";
        let (header, rows) = parse_csv(content).unwrap();

        assert_eq!(header, vec!["first_name", "last_name", "grade"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, vec!["Ana", "Silva", "7"]);
    }

    #[test]
    fn linha_com_grade_invalida_vira_erro_com_o_numero_da_linha() {
        let header: Vec<String> = ["first_name", "last_name", "grade"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row: Vec<String> = ["Ana", "Silva", "sete"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let err = student_payload(&header, &row, 3).unwrap_err();
        match err {
            AppError::CsvInvalidRow { line, .. } => assert_eq!(line, 3),
            other => panic!("erro inesperado: {other:?}"),
        }
    }
}
