// src/services/academics_service.rs

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{validation_error, AppError},
    db::{billing_repo::allocate_sequence, AcademicsRepository, StudentRepository},
    models::{
        academics::{
            Assessment, CreateAssessmentPayload, CreateReportCardPayload, ReportCard,
            ReportCardDetail, ReportCardStatus,
        },
        students::{CreateStudentPayload, Student, UpdateStudentPayload},
    },
    services::sequence::format_student_number,
};

// --- A MÉDIA PONDERADA ---
// Σ(nota * peso) / Σ(peso), arredondada a 2 casas. Sem avaliações (ou
// com todos os pesos zerados) a média é 0 — nunca divisão por zero.

pub fn weighted_average(assessments: &[Assessment]) -> Decimal {
    let total_weight: Decimal = assessments.iter().map(|a| a.weight).sum();
    if total_weight.is_zero() {
        return Decimal::ZERO;
    }

    let weighted_sum: Decimal = assessments.iter().map(|a| a.score * a.weight).sum();
    (weighted_sum / total_weight).round_dp(2)
}

/// Comentário automático por faixa de desempenho, no idioma do aluno.
pub fn subject_comment(subject: &str, average: Decimal, language: &str) -> String {
    let band = if average >= Decimal::from(80) {
        Band::Excellent
    } else if average >= Decimal::from(60) {
        Band::Good
    } else if average >= Decimal::from(40) {
        Band::NeedsImprovement
    } else {
        Band::AtRisk
    };

    match (language, band) {
        ("pt", Band::Excellent) => format!("Desempenho excelente em {subject}."),
        ("pt", Band::Good) => format!("Bom desempenho em {subject}."),
        ("pt", Band::NeedsImprovement) => format!("Precisa melhorar em {subject}."),
        ("pt", Band::AtRisk) => format!("Desempenho preocupante em {subject}; acompanhamento recomendado."),
        (_, Band::Excellent) => format!("Excellent performance in {subject}."),
        (_, Band::Good) => format!("Good performance in {subject}."),
        (_, Band::NeedsImprovement) => format!("Needs improvement in {subject}."),
        (_, Band::AtRisk) => format!("At-risk performance in {subject}; follow-up recommended."),
    }
}

#[derive(Clone, Copy)]
enum Band {
    Excellent,
    Good,
    NeedsImprovement,
    AtRisk,
}

fn validate_percent(field: &'static str, value: Decimal) -> Result<(), AppError> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err(validation_error(field, "O valor deve estar entre 0 e 100"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AcademicsService {
    repo: AcademicsRepository,
    student_repo: StudentRepository,
}

impl AcademicsService {
    pub fn new(repo: AcademicsRepository, student_repo: StudentRepository) -> Self {
        Self { repo, student_repo }
    }

    // =========================================================================
    //  ALUNOS
    // =========================================================================

    /// Cria o aluno alocando o número de matrícula do ano corrente na
    /// mesma transação do INSERT.
    pub async fn create_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateStudentPayload,
    ) -> Result<Student, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validator::Validate::validate(input)?;

        let mut tx = executor.begin().await?;

        let year = Utc::now().date_naive().year();
        let value = allocate_sequence(&mut *tx, owner_id, "STUDENT", year).await?;
        let student_number = format_student_number(year, value);

        let student = self
            .student_repo
            .insert_student(&mut *tx, owner_id, &student_number, input)
            .await?;

        tx.commit().await?;

        tracing::info!("Aluno {} matriculado", student.student_number);

        Ok(student)
    }

    pub async fn list_students<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Student>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.student_repo.list_students(executor, owner_id, search).await
    }

    pub async fn get_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<Student, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.student_repo
            .find_by_id(executor, owner_id, student_id)
            .await?
            .ok_or(AppError::StudentNotFound)
    }

    pub async fn update_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        input: &UpdateStudentPayload,
    ) -> Result<Student, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validator::Validate::validate(input)?;

        self.student_repo
            .update_student(executor, owner_id, student_id, input)
            .await?
            .ok_or(AppError::StudentNotFound)
    }

    pub async fn delete_student<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self
            .student_repo
            .delete_student(executor, owner_id, student_id)
            .await?;
        if !deleted {
            return Err(AppError::StudentNotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  AVALIAÇÕES
    // =========================================================================

    pub async fn create_assessment<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateAssessmentPayload,
    ) -> Result<Assessment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validator::Validate::validate(input)?;
        validate_percent("weight", input.weight)?;
        validate_percent("score", input.score)?;

        let mut tx = executor.begin().await?;

        self.student_repo
            .find_by_id(&mut *tx, owner_id, input.student_id)
            .await?
            .ok_or(AppError::StudentNotFound)?;

        let assessment = self.repo.create_assessment(&mut *tx, owner_id, input).await?;

        tx.commit().await?;

        Ok(assessment)
    }

    pub async fn list_assessments<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        term: Option<i16>,
        year: Option<i32>,
    ) -> Result<Vec<Assessment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_assessments(executor, owner_id, student_id, term, year)
            .await
    }

    pub async fn delete_assessment<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        assessment_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deleted = self.repo.delete_assessment(executor, owner_id, assessment_id).await?;
        if !deleted {
            return Err(AppError::AssessmentNotFound);
        }
        Ok(())
    }

    /// Média ponderada de uma matéria no período, calculada sob demanda.
    pub async fn subject_average<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
        subject: &str,
        term: i16,
        year: i32,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assessments = self
            .repo
            .assessments_for_subject(executor, owner_id, student_id, subject, term, year)
            .await?;

        Ok(weighted_average(&assessments))
    }

    // =========================================================================
    //  BOLETINS
    // =========================================================================

    /// Gera o boletim do período: uma linha por matéria avaliada, com a
    /// média ponderada congelada no momento da geração e o comentário
    /// automático no idioma do aluno.
    pub async fn create_report_card<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateReportCardPayload,
    ) -> Result<ReportCardDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validator::Validate::validate(input)?;

        let mut tx = executor.begin().await?;

        let student = self
            .student_repo
            .find_by_id(&mut *tx, owner_id, input.student_id)
            .await?
            .ok_or(AppError::StudentNotFound)?;

        let report_card = self.repo.insert_report_card(&mut *tx, owner_id, input).await?;

        let subjects = self
            .repo
            .subjects_for_term(&mut *tx, owner_id, student.id, input.term, input.year)
            .await?;

        let mut rows = Vec::with_capacity(subjects.len());
        for subject in &subjects {
            let assessments = self
                .repo
                .assessments_for_subject(
                    &mut *tx,
                    owner_id,
                    student.id,
                    subject,
                    input.term,
                    input.year,
                )
                .await?;

            let average = weighted_average(&assessments);
            let comment = subject_comment(subject, average, &student.language);

            let row = self
                .repo
                .insert_report_card_subject(&mut *tx, report_card.id, subject, average, &comment)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;

        Ok(ReportCardDetail {
            report_card,
            subjects: rows,
        })
    }

    pub async fn get_report_card<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        report_card_id: Uuid,
    ) -> Result<ReportCardDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let report_card = self
            .repo
            .find_report_card(&mut *tx, owner_id, report_card_id)
            .await?
            .ok_or(AppError::ReportCardNotFound)?;

        let subjects = self
            .repo
            .list_report_card_subjects(&mut *tx, report_card.id)
            .await?;

        tx.commit().await?;

        Ok(ReportCardDetail {
            report_card,
            subjects,
        })
    }

    pub async fn list_report_cards<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        student_id: Uuid,
    ) -> Result<Vec<ReportCard>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_report_cards(executor, owner_id, student_id).await
    }

    /// DRAFT -> PUBLISHED -> ARCHIVED (sem voltar atrás).
    pub async fn update_report_card_status<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        report_card_id: Uuid,
        status: ReportCardStatus,
    ) -> Result<ReportCard, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let card = self
            .repo
            .find_report_card(&mut *tx, owner_id, report_card_id)
            .await?
            .ok_or(AppError::ReportCardNotFound)?;

        let allowed = matches!(
            (card.status, status),
            (ReportCardStatus::Draft, ReportCardStatus::Published)
                | (ReportCardStatus::Published, ReportCardStatus::Archived)
        );
        if !allowed {
            return Err(AppError::InvalidStatusTransition(
                report_card_status_str(card.status),
                report_card_status_str(status),
            ));
        }

        let updated = self
            .repo
            .update_report_card_status(&mut *tx, owner_id, report_card_id, status)
            .await?
            .ok_or(AppError::ReportCardNotFound)?;

        tx.commit().await?;

        Ok(updated)
    }
}

fn report_card_status_str(status: ReportCardStatus) -> &'static str {
    match status {
        ReportCardStatus::Draft => "DRAFT",
        ReportCardStatus::Published => "PUBLISHED",
        ReportCardStatus::Archived => "ARCHIVED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn assessment(score: Decimal, weight: Decimal) -> Assessment {
        Assessment {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            subject: "Matemática".to_string(),
            term: 1,
            year: 2026,
            kind: "prova".to_string(),
            weight,
            score,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn media_ponderada_basica() {
        // (80*50 + 60*50) / 100 = 70
        let assessments = vec![
            assessment(dec!(80), dec!(50)),
            assessment(dec!(60), dec!(50)),
        ];
        assert_eq!(weighted_average(&assessments), dec!(70.00));
    }

    #[test]
    fn pesos_desiguais_puxam_a_media() {
        // (90*75 + 50*25) / 100 = 80
        let assessments = vec![
            assessment(dec!(90), dec!(75)),
            assessment(dec!(50), dec!(25)),
        ];
        assert_eq!(weighted_average(&assessments), dec!(80.00));
    }

    #[test]
    fn pesos_nao_precisam_somar_cem() {
        // (80*30 + 60*30) / 60 = 70
        let assessments = vec![
            assessment(dec!(80), dec!(30)),
            assessment(dec!(60), dec!(30)),
        ];
        assert_eq!(weighted_average(&assessments), dec!(70.00));
    }

    #[test]
    fn sem_avaliacoes_a_media_e_zero() {
        assert_eq!(weighted_average(&[]), Decimal::ZERO);
    }

    #[test]
    fn pesos_todos_zerados_nao_dividem_por_zero() {
        let assessments = vec![assessment(dec!(80), dec!(0))];
        assert_eq!(weighted_average(&assessments), Decimal::ZERO);
    }

    #[test]
    fn media_arredonda_a_duas_casas() {
        // (70*1 + 80*2) / 3 = 76.666... -> 76.67
        let assessments = vec![
            assessment(dec!(70), dec!(1)),
            assessment(dec!(80), dec!(2)),
        ];
        assert_eq!(weighted_average(&assessments), dec!(76.67));
    }

    #[test]
    fn comentario_segue_a_faixa_e_o_idioma() {
        assert_eq!(
            subject_comment("Matemática", dec!(85), "pt"),
            "Desempenho excelente em Matemática."
        );
        assert_eq!(
            subject_comment("Matemática", dec!(70), "pt"),
            "Bom desempenho em Matemática."
        );
        assert_eq!(
            subject_comment("History", dec!(45), "en"),
            "Needs improvement in History."
        );
        assert_eq!(
            subject_comment("History", dec!(20), "en"),
            "At-risk performance in History; follow-up recommended."
        );
    }

    #[test]
    fn fronteiras_das_faixas_sao_inclusivas() {
        assert!(subject_comment("X", dec!(80), "en").starts_with("Excellent"));
        assert!(subject_comment("X", dec!(60), "en").starts_with("Good"));
        assert!(subject_comment("X", dec!(40), "en").starts_with("Needs"));
    }
}
