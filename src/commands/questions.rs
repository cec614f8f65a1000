// Question commands
// Browsing the catalog and running or submitting code from the editor

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;
use crate::models::{
    Achievement, Badge, CoinSource, Difficulty, ExecutionResult, LevelInfo, Question,
    UserProgress,
};
use crate::services::{catalog, get_user_level, ACHIEVEMENT_COIN_REWARD};

/// Catalog row for the question list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummaryDto {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub xp_reward: u32,
    pub coin_reward: u32,
    pub solved: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub difficulty: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetailDto {
    #[serde(flatten)]
    pub question: Question,
    pub statement_html: String,
    pub solved: bool,
}

/// Outcome of a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub accepted: bool,
    pub result: ExecutionResult,
    pub first_solve: bool,
    pub xp_earned: u32,
    pub coins_earned: u32,
    pub new_achievements: Vec<Achievement>,
    pub new_badges: Vec<Badge>,
    pub progress: UserProgress,
    pub level: LevelInfo,
}

fn find_question(question_id: u32) -> Result<&'static Question, String> {
    catalog::get_question_by_id(question_id)
        .ok_or_else(|| AppError::QuestionNotFound(question_id).to_string())
}

/// Pays the coin bonus for each new achievement, returns (xp, coins)
pub(super) fn credit_achievements(
    state: &AppState,
    user_id: &str,
    achievements: &[Achievement],
) -> Result<(u32, u32), String> {
    let mut xp = 0;
    let mut coins = 0;
    for achievement in achievements {
        xp += achievement.xp_reward;
        coins += ACHIEVEMENT_COIN_REWARD;
        state
            .coins
            .earn(
                user_id,
                ACHIEVEMENT_COIN_REWARD,
                &format!("Unlocked {}", achievement.name),
                CoinSource::Achievement,
            )
            .map_err(|e| e.to_string())?;
    }
    Ok((xp, coins))
}

/// List questions, optionally filtered
pub async fn list_questions(
    filter: QuestionFilter,
    state: &AppState,
) -> Result<Vec<QuestionSummaryDto>, String> {
    let user_id = state.current_user_id()?;
    let progress = state
        .tracker
        .get_user_progress(&user_id)
        .map_err(|e| e.to_string())?;

    let mut questions: Vec<&Question> = match &filter.search {
        Some(keyword) => catalog::search_questions(keyword),
        None => catalog::get_all_questions().iter().collect(),
    };

    if let Some(difficulty) = &filter.difficulty {
        let difficulty: Difficulty = difficulty.parse()?;
        questions.retain(|q| q.difficulty == difficulty);
    }
    if let Some(tag) = &filter.tag {
        questions.retain(|q| q.tags.iter().any(|t| t == tag));
    }

    Ok(questions
        .into_iter()
        .map(|q| QuestionSummaryDto {
            id: q.id,
            title: q.title.clone(),
            difficulty: q.difficulty,
            tags: q.tags.clone(),
            xp_reward: q.xp_reward,
            coin_reward: q.coin_reward,
            solved: progress.has_completed(q.id),
        })
        .collect())
}

/// Get one question with its statement rendered to HTML
pub async fn get_question(question_id: u32, state: &AppState) -> Result<QuestionDetailDto, String> {
    let question = find_question(question_id)?;
    let user_id = state.current_user_id()?;
    let progress = state
        .tracker
        .get_user_progress(&user_id)
        .map_err(|e| e.to_string())?;

    Ok(QuestionDetailDto {
        statement_html: catalog::render_statement_html(question),
        solved: progress.has_completed(question_id),
        question: question.clone(),
    })
}

/// Run the code against the question's fixtures without recording anything
pub async fn run_code(
    question_id: u32,
    code: String,
    state: &AppState,
) -> Result<ExecutionResult, String> {
    let question = find_question(question_id)?;

    let check = state.executor.validate_syntax(&code);
    if !check.valid {
        return Err(check.error.unwrap_or_else(|| "Invalid code".to_string()));
    }

    Ok(state.executor.execute_code(&code, &question.test_cases).await)
}

/// Run the code and record the result against the current user
pub async fn submit_solution(
    question_id: u32,
    code: String,
    state: &AppState,
) -> Result<SubmissionDto, String> {
    let question = find_question(question_id)?;
    let user_id = state.current_user_id()?;

    let result = run_code(question_id, code, state).await?;

    if !result.success {
        let progress = state
            .tracker
            .record_failed_submission(&user_id, result.execution_time)
            .map_err(|e| e.to_string())?;

        log::info!(
            "user {} failed question {} ({} of {} cases)",
            user_id,
            question_id,
            result.failed_count(),
            result.test_cases.len()
        );

        return Ok(SubmissionDto {
            accepted: false,
            result,
            first_solve: false,
            xp_earned: 0,
            coins_earned: 0,
            new_achievements: Vec::new(),
            new_badges: Vec::new(),
            level: get_user_level(progress.total_xp),
            progress,
        });
    }

    let completion = state
        .tracker
        .record_completion(
            &user_id,
            question_id,
            question.xp_reward,
            result.execution_time,
            Local::now(),
        )
        .map_err(|e| e.to_string())?;

    let mut xp_earned = 0;
    let mut coins_earned = 0;

    if completion.first_solve {
        xp_earned += question.xp_reward;
        coins_earned += question.coin_reward;
        state
            .coins
            .earn(
                &user_id,
                question.coin_reward,
                &format!("Solved {}", question.title),
                CoinSource::Question,
            )
            .map_err(|e| e.to_string())?;
    }

    let (achievement_xp, achievement_coins) =
        credit_achievements(state, &user_id, &completion.new_achievements)?;
    xp_earned += achievement_xp;
    coins_earned += achievement_coins;

    Ok(SubmissionDto {
        accepted: true,
        result,
        first_solve: completion.first_solve,
        xp_earned,
        coins_earned,
        new_achievements: completion.new_achievements,
        new_badges: completion.new_badges,
        level: get_user_level(completion.progress.total_xp),
        progress: completion.progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;

    fn template(id: u32) -> String {
        catalog::get_question_by_id(id).unwrap().code_template.clone()
    }

    #[tokio::test]
    async fn test_list_and_filter() {
        let state = test_state();

        let all = list_questions(QuestionFilter::default(), &state).await.unwrap();
        assert_eq!(all.len(), catalog::question_count());
        assert!(all.iter().all(|q| !q.solved));

        let easy = list_questions(
            QuestionFilter {
                difficulty: Some("easy".to_string()),
                ..QuestionFilter::default()
            },
            &state,
        )
        .await
        .unwrap();
        assert!(!easy.is_empty());
        assert!(easy.iter().all(|q| q.difficulty == Difficulty::Easy));

        assert!(list_questions(
            QuestionFilter {
                difficulty: Some("impossible".to_string()),
                ..QuestionFilter::default()
            },
            &state,
        )
        .await
        .is_err());
    }

    #[tokio::test]
    async fn test_get_question() {
        let state = test_state();
        let detail = get_question(1, &state).await.unwrap();
        assert_eq!(detail.question.id, 1);
        assert!(detail.statement_html.contains("<h2>"));

        assert!(get_question(999, &state).await.is_err());
    }

    #[tokio::test]
    async fn test_run_code_rejects_empty() {
        let state = test_state();
        assert_eq!(
            run_code(1, "   ".to_string(), &state).await.unwrap_err(),
            "Code cannot be empty"
        );
    }

    #[tokio::test]
    async fn test_submit_template_awards_xp_and_coins() {
        let state = test_state();
        let question = catalog::get_question_by_id(1).unwrap();

        let first = submit_solution(1, template(1), &state).await.unwrap();
        assert!(first.accepted);
        assert!(first.first_solve);
        assert!(first.new_achievements.iter().any(|a| a.id == "first_solve"));
        assert_eq!(first.new_badges[0].id, "beginner");

        let achievement_xp: u32 = first.new_achievements.iter().map(|a| a.xp_reward).sum();
        let unlocked = first.new_achievements.len() as u32;
        assert_eq!(first.xp_earned, question.xp_reward + achievement_xp);
        assert_eq!(first.progress.total_xp, first.xp_earned);
        assert_eq!(
            first.coins_earned,
            question.coin_reward + unlocked * ACHIEVEMENT_COIN_REWARD
        );

        let again = submit_solution(1, template(1), &state).await.unwrap();
        assert!(again.accepted);
        assert!(!again.first_solve);
        assert_eq!(again.xp_earned, 0);
        assert_eq!(again.progress.total_xp, first.progress.total_xp);
        assert_eq!(again.progress.statistics.total_questions_solved, 1);

        let user = state.current_user_id().unwrap();
        assert_eq!(state.coins.balance(&user).unwrap(), first.coins_earned);
    }

    #[tokio::test]
    async fn test_failed_submission_counts_attempt() {
        let state = test_state();

        let outcome = submit_solution(2, template(1), &state).await.unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.xp_earned, 0);
        assert_eq!(outcome.progress.statistics.total_submissions, 1);
        assert_eq!(outcome.progress.statistics.accuracy, 0.0);
        assert!(outcome.progress.completed_questions.is_empty());
    }
}
