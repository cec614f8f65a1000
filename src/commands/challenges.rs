// Challenge commands
// Challenge list, joining and finishing a challenge with a solution

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use super::questions::{credit_achievements, run_code};
use super::AppState;
use crate::models::{Challenge, ChallengeStatus, CoinSource, ExecutionResult, TestStatus};

/// Challenge XP converted to coins at this ratio
const CHALLENGE_XP_PER_COIN: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResultDto {
    pub challenge: Challenge,
    pub result: ExecutionResult,
    /// Percentage of fixtures passed
    pub score: u32,
    pub completion_time: u32,
    pub xp_earned: u32,
    pub coins_earned: u32,
}

fn parse_status(status: &str) -> Result<ChallengeStatus, String> {
    match status.to_ascii_lowercase().as_str() {
        "waiting" => Ok(ChallengeStatus::Waiting),
        "active" => Ok(ChallengeStatus::Active),
        "completed" => Ok(ChallengeStatus::Completed),
        other => Err(format!("unknown challenge status: {}", other)),
    }
}

pub async fn list_challenges(
    status: Option<String>,
    state: &AppState,
) -> Result<Vec<Challenge>, String> {
    let status = status.as_deref().map(parse_status).transpose()?;
    state.challenges.list(status).map_err(|e| e.to_string())
}

/// Challenges the current user has joined
pub async fn joined_challenges(state: &AppState) -> Result<Vec<Challenge>, String> {
    let user_id = state.current_user_id()?;
    state
        .challenges
        .joined_by(&user_id)
        .map_err(|e| e.to_string())
}

pub async fn get_challenge(challenge_id: String, state: &AppState) -> Result<Challenge, String> {
    state
        .challenges
        .get(&challenge_id)
        .map_err(|e| e.to_string())
}

pub async fn join_challenge(challenge_id: String, state: &AppState) -> Result<Challenge, String> {
    let user_id = state.current_user_id()?;
    state
        .challenges
        .join(&challenge_id, &user_id)
        .map_err(|e| e.to_string())
}

pub async fn leave_challenge(challenge_id: String, state: &AppState) -> Result<Challenge, String> {
    let user_id = state.current_user_id()?;
    state
        .challenges
        .leave(&challenge_id, &user_id)
        .map_err(|e| e.to_string())
}

/// Runs the code against the challenge question and records the score.
/// Passing every fixture also counts as solving the question, with the
/// challenge's XP reward. A participant finishes a challenge once.
pub async fn finish_challenge(
    challenge_id: String,
    code: String,
    state: &AppState,
) -> Result<ChallengeResultDto, String> {
    let user_id = state.current_user_id()?;

    let challenge = state
        .challenges
        .ensure_can_submit(&challenge_id, &user_id)
        .map_err(|e| e.to_string())?;

    let result = run_code(challenge.question_id, code, state).await?;

    let total = result.test_cases.len().max(1) as u32;
    let passed = result
        .test_cases
        .iter()
        .filter(|t| t.status == TestStatus::Passed)
        .count() as u32;
    let score = passed * 100 / total;
    let elapsed = (Utc::now() - challenge.start_time).num_seconds().max(0);
    let completion_time = u32::try_from(elapsed).unwrap_or(u32::MAX);

    let updated = state
        .challenges
        .submit_score(&challenge_id, &user_id, score, completion_time)
        .map_err(|e| e.to_string())?;
    let mut xp_earned = 0;
    let mut coins_earned = 0;

    if result.success {
        let completion = state
            .tracker
            .record_completion(
                &user_id,
                challenge.question_id,
                challenge.xp_reward,
                result.execution_time,
                Local::now(),
            )
            .map_err(|e| e.to_string())?;

        if completion.first_solve {
            xp_earned += challenge.xp_reward;
        }

        let reward = challenge.xp_reward / CHALLENGE_XP_PER_COIN;
        coins_earned += reward;
        state
            .coins
            .earn(
                &user_id,
                reward,
                &format!("Completed {}", challenge.title),
                CoinSource::Challenge,
            )
            .map_err(|e| e.to_string())?;

        let (achievement_xp, achievement_coins) =
            credit_achievements(state, &user_id, &completion.new_achievements)?;
        xp_earned += achievement_xp;
        coins_earned += achievement_coins;
    } else {
        state
            .tracker
            .record_failed_submission(&user_id, result.execution_time)
            .map_err(|e| e.to_string())?;
    }

    log::info!(
        "user {} finished challenge {} with score {}",
        user_id,
        challenge_id,
        score
    );

    Ok(ChallengeResultDto {
        challenge: updated,
        result,
        score,
        completion_time,
        xp_earned,
        coins_earned,
    })
}
