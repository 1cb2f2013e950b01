// src/store/seed.rs

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::question::{ExamType, NewQuestion};

/// Inserts one question through any SQLite executor (pool, connection or transaction).
pub async fn insert_question<'c, E>(executor: E, q: &NewQuestion) -> Result<i64, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let [a, b, c, d] = &q.options;
    let id = sqlx::query(
        r#"
        INSERT INTO questions
            (exam_type, category, question_text, option_a, option_b, option_c, option_d,
             correct_answer, explanation)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(q.exam_type.as_str())
    .bind(&q.category)
    .bind(&q.question_text)
    .bind(a)
    .bind(b)
    .bind(c)
    .bind(d)
    .bind(&q.correct_answer)
    .bind(&q.explanation)
    .execute(executor)
    .await?
    .last_insert_rowid();
    Ok(id)
}

/// Fills an empty question bank with a starter set for each exam type.
/// Returns how many questions were inserted (0 if the bank already had content).
pub async fn seed_sample_questions(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let questions = sample_questions();
    let mut tx = pool.begin().await?;
    for q in &questions {
        insert_question(&mut *tx, q).await?;
    }
    tx.commit().await?;

    Ok(questions.len())
}

fn q(
    exam_type: ExamType,
    category: &str,
    text: &str,
    options: [&str; 4],
    correct: &str,
    explanation: &str,
) -> NewQuestion {
    NewQuestion {
        exam_type,
        category: category.to_string(),
        question_text: text.to_string(),
        options: options.map(str::to_string),
        correct_answer: correct.to_string(),
        explanation: Some(explanation.to_string()),
    }
}

fn sample_questions() -> Vec<NewQuestion> {
    use ExamType::{Icfes, SaberPro};

    vec![
        q(
            Icfes,
            "Matemáticas",
            "Si x + 5 = 12, ¿cuál es el valor de x?",
            ["5", "7", "17", "2"],
            "B",
            "x + 5 = 12, entonces x = 12 - 5 = 7",
        ),
        q(
            Icfes,
            "Lenguaje",
            "¿Cuál de las siguientes palabras es un sinónimo de \"rápido\"?",
            ["Lento", "Veloz", "Tranquilo", "Pesado"],
            "B",
            "Veloz es un sinónimo de rápido",
        ),
        q(
            Icfes,
            "Ciencias",
            "¿Cuál es el planeta más cercano al Sol?",
            ["Venus", "Tierra", "Mercurio", "Marte"],
            "C",
            "Mercurio es el planeta más cercano al Sol",
        ),
        q(
            SaberPro,
            "Razonamiento Cuantitativo",
            "Una empresa tiene utilidades de $50,000 y gastos de $30,000. ¿Cuál es la ganancia neta?",
            ["$20,000", "$80,000", "$15,000", "$25,000"],
            "A",
            "Ganancia neta = Utilidades - Gastos = $50,000 - $30,000 = $20,000",
        ),
        q(
            SaberPro,
            "Lectura Crítica",
            "En un texto argumentativo, la tesis principal:",
            [
                "Siempre aparece al final",
                "Es la idea principal que se defiende",
                "No es necesaria",
                "Debe ser contradictoria",
            ],
            "B",
            "La tesis es la idea principal que el autor defiende a lo largo del texto",
        ),
        q(
            SaberPro,
            "Competencias Ciudadanas",
            "La democracia se caracteriza principalmente por:",
            [
                "El poder de una sola persona",
                "La participación ciudadana",
                "La ausencia de leyes",
                "La desigualdad social",
            ],
            "B",
            "La democracia se basa en la participación activa de los ciudadanos",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::memory_pool;

    #[tokio::test]
    async fn seeds_only_an_empty_bank() {
        let pool = memory_pool().await;
        assert_eq!(seed_sample_questions(&pool).await.unwrap(), 6);
        assert_eq!(seed_sample_questions(&pool).await.unwrap(), 0);

        let icfes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE exam_type = 'ICFES'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(icfes, 3);
    }
}
