// src/services/recurrence_service.rs

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{validation_error, AppError},
    db::{
        billing_repo::allocate_sequence, BillingRepository, ClientRepository, SettingsRepository,
    },
    models::billing::{
        CreateRecurringPayload, Document, DocumentKind, Frequency, LineItemPayload,
        RecurringStatus, RecurringTemplate,
    },
    services::{billing_service::document_totals, sequence::format_document_number},
};

// --- O CADENCIADOR ---
// Funções puras de calendário. O passo mensal/trimestral/anual usa
// `checked_add_months`, que fixa no fim do mês quando o dia não existe
// (31/jan + 1 mês = 29/fev em ano bissexto, 28/fev nos demais).

/// Próxima data a partir de `from`, segundo a frequência.
pub fn step(frequency: Frequency, from: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Weekly => from + Duration::days(7),
        Frequency::Monthly => from.checked_add_months(Months::new(1)).unwrap_or(from),
        Frequency::Quarterly => from.checked_add_months(Months::new(3)).unwrap_or(from),
        Frequency::Yearly => from.checked_add_months(Months::new(12)).unwrap_or(from),
    }
}

/// Data da próxima instância do modelo: a primeira é a própria
/// `start_date`; depois, um passo a partir da última gerada.
pub fn next_instance_date(template: &RecurringTemplate) -> NaiveDate {
    match template.last_generated {
        None => template.start_date,
        Some(last) => step(template.frequency, last),
    }
}

/// Um modelo está "vencido" quando está ativo e sua próxima instância
/// cai hoje ou no passado.
pub fn is_due(template: &RecurringTemplate, today: NaiveDate) -> bool {
    template.status == RecurringStatus::Active && next_instance_date(template) <= today
}

#[derive(Clone)]
pub struct RecurrenceService {
    repo: BillingRepository,
    client_repo: ClientRepository,
    settings_repo: SettingsRepository,
}

impl RecurrenceService {
    pub fn new(
        repo: BillingRepository,
        client_repo: ClientRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self {
            repo,
            client_repo,
            settings_repo,
        }
    }

    pub async fn create_template<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        input: &CreateRecurringPayload,
    ) -> Result<RecurringTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validator::Validate::validate(input)?;
        if input.amount < Decimal::ZERO {
            return Err(validation_error("amount", "O valor não pode ser negativo"));
        }
        if let Some(tax_rate) = input.tax_rate {
            if tax_rate < Decimal::ZERO {
                return Err(validation_error("taxRate", "A alíquota não pode ser negativa"));
            }
        }
        if let Some(end_date) = input.end_date {
            if end_date <= input.start_date {
                return Err(validation_error(
                    "endDate",
                    "A data final deve ser depois da inicial",
                ));
            }
        }

        let mut tx = executor.begin().await?;

        self.client_repo
            .find_by_id(&mut *tx, owner_id, input.client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let template = self.repo.insert_template(&mut *tx, owner_id, input).await?;

        tx.commit().await?;

        Ok(template)
    }

    pub async fn list_templates<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        status: Option<RecurringStatus>,
    ) -> Result<Vec<RecurringTemplate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_templates(executor, owner_id, status).await
    }

    pub async fn get_template<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        template_id: Uuid,
    ) -> Result<RecurringTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_template(executor, owner_id, template_id)
            .await?
            .ok_or(AppError::TemplateNotFound)
    }

    /// ACTIVE <-> PAUSED pelo usuário. COMPLETED é terminal e só o
    /// sistema atribui.
    pub async fn set_template_status<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
        template_id: Uuid,
        status: RecurringStatus,
    ) -> Result<RecurringTemplate, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let template = self
            .repo
            .find_template(&mut *tx, owner_id, template_id)
            .await?
            .ok_or(AppError::TemplateNotFound)?;

        let allowed = matches!(
            (template.status, status),
            (RecurringStatus::Active, RecurringStatus::Paused)
                | (RecurringStatus::Paused, RecurringStatus::Active)
        );
        if !allowed {
            return Err(AppError::InvalidStatusTransition(
                recurring_status_str(template.status),
                recurring_status_str(status),
            ));
        }

        let updated = self
            .repo
            .update_template_status(&mut *tx, owner_id, template_id, status)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Gera as faturas vencidas de todos os modelos ativos do dono. Se o
    /// job ficou dias sem rodar, gera TODAS as instâncias atrasadas, uma
    /// por cadência (catch-up), sempre ancorando na data da instância e
    /// não na data da execução.
    pub async fn run_for_owner<'e, E>(
        &self,
        executor: E,
        owner_id: Uuid,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let today = Utc::now().date_naive();
        let settings = self.settings_repo.get_settings(&mut *tx, owner_id).await?;
        let templates = self
            .repo
            .list_templates(&mut *tx, owner_id, Some(RecurringStatus::Active))
            .await?;

        let mut generated = Vec::new();

        for mut template in templates {
            while is_due(&template, today) {
                let instance_date = next_instance_date(&template);

                // Passou do fim? Completa o modelo sem gerar.
                if template.end_date.is_some_and(|end| instance_date > end) {
                    self.repo
                        .update_template_status(
                            &mut *tx,
                            owner_id,
                            template.id,
                            RecurringStatus::Completed,
                        )
                        .await?;
                    template.status = RecurringStatus::Completed;
                    break;
                }

                let document = self
                    .generate_invoice(&mut tx, owner_id, &settings, &template, instance_date)
                    .await?;

                // Completa imediatamente se a PRÓXIMA instância já estoura o fim
                let next = step(template.frequency, instance_date);
                let status = match template.end_date {
                    Some(end) if next > end => RecurringStatus::Completed,
                    _ => RecurringStatus::Active,
                };

                self.repo
                    .advance_template(&mut *tx, template.id, instance_date, status)
                    .await?;
                template.last_generated = Some(instance_date);
                template.status = status;

                generated.push(document);
            }
        }

        tx.commit().await?;

        if !generated.is_empty() {
            tracing::info!(
                "Recorrência: {} fatura(s) gerada(s) para o dono {}",
                generated.len(),
                owner_id
            );
        }

        Ok(generated)
    }

    /// Cria a fatura (DRAFT) de uma instância do modelo: um item de linha
    /// com a descrição e o valor do modelo, número da sequência do ano da
    /// instância, vencimento pelo prazo do cliente.
    async fn generate_invoice(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        owner_id: Uuid,
        settings: &crate::models::settings::AccountSettings,
        template: &RecurringTemplate,
        instance_date: NaiveDate,
    ) -> Result<Document, AppError> {
        let client = self
            .client_repo
            .find_by_id(&mut **tx, owner_id, template.client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let year = instance_date.year();
        let value = allocate_sequence(&mut **tx, owner_id, "INVOICE", year).await?;
        let number = format_document_number(&settings.invoice_prefix, year, value);

        let due_date =
            instance_date + Duration::days(i64::from(client.payment_terms_days));

        let document = self
            .repo
            .insert_document(
                &mut **tx,
                owner_id,
                client.id,
                DocumentKind::Invoice,
                &number,
                instance_date,
                Some(due_date),
                &client.currency,
                template.tax_rate,
            )
            .await?;

        let item_payload = LineItemPayload {
            description: template.description.clone(),
            quantity: 1,
            rate: template.amount,
        };
        let item = self
            .repo
            .insert_line_item(&mut **tx, document.id, &item_payload, 0)
            .await?;

        let totals = document_totals(std::slice::from_ref(&item), template.tax_rate);
        self.repo
            .update_document_totals(
                &mut **tx,
                document.id,
                totals.subtotal,
                totals.tax_amount,
                totals.total,
            )
            .await?;

        let document = self
            .repo
            .find_document(&mut **tx, owner_id, document.id)
            .await?
            .ok_or(AppError::DocumentNotFound)?;

        Ok(document)
    }
}

fn recurring_status_str(status: RecurringStatus) -> &'static str {
    match status {
        RecurringStatus::Active => "ACTIVE",
        RecurringStatus::Paused => "PAUSED",
        RecurringStatus::Completed => "COMPLETED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn template(
        frequency: Frequency,
        start: NaiveDate,
        last: Option<NaiveDate>,
        status: RecurringStatus,
    ) -> RecurringTemplate {
        let now: DateTime<Utc> = Utc::now();
        RecurringTemplate {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            description: "Mensalidade".to_string(),
            amount: dec!(350.00),
            tax_rate: dec!(0.00),
            frequency,
            start_date: start,
            end_date: None,
            last_generated: last,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn passo_mensal_fixa_no_fim_do_mes() {
        // 31/jan + 1 mês: fevereiro não tem dia 31
        assert_eq!(step(Frequency::Monthly, date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(step(Frequency::Monthly, date(2023, 1, 31)), date(2023, 2, 28));
        assert_eq!(step(Frequency::Monthly, date(2026, 3, 15)), date(2026, 4, 15));
    }

    #[test]
    fn passo_semanal_soma_sete_dias() {
        assert_eq!(step(Frequency::Weekly, date(2026, 8, 28)), date(2026, 9, 4));
    }

    #[test]
    fn passo_trimestral_e_anual() {
        assert_eq!(step(Frequency::Quarterly, date(2026, 1, 31)), date(2026, 4, 30));
        assert_eq!(step(Frequency::Yearly, date(2024, 2, 29)), date(2025, 2, 28));
    }

    #[test]
    fn primeira_instancia_e_a_data_de_inicio() {
        let t = template(
            Frequency::Monthly,
            date(2026, 1, 15),
            None,
            RecurringStatus::Active,
        );
        assert_eq!(next_instance_date(&t), date(2026, 1, 15));
        assert!(is_due(&t, date(2026, 1, 15)));
        assert!(!is_due(&t, date(2026, 1, 14)));
    }

    #[test]
    fn instancias_seguintes_ancoram_na_ultima_gerada() {
        let t = template(
            Frequency::Monthly,
            date(2026, 1, 31),
            Some(date(2026, 2, 28)),
            RecurringStatus::Active,
        );
        assert_eq!(next_instance_date(&t), date(2026, 3, 28));
    }

    #[test]
    fn modelo_pausado_nunca_esta_vencido() {
        let t = template(
            Frequency::Weekly,
            date(2026, 1, 1),
            None,
            RecurringStatus::Paused,
        );
        assert!(!is_due(&t, date(2026, 12, 31)));
    }
}
