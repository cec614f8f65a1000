// Challenge board
// Multiplayer challenges kept as one JSON list, seeded on first read

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{
    Challenge, ChallengeParticipant, ChallengeStatus, Difficulty, ParticipantStatus,
};
use crate::services::storage::KeyValueStore;

pub const CHALLENGES_KEY: &str = "crackalgo_challenges";

const JOINED_NAME: &str = "You";
const JOINED_AVATAR: &str = "👤";

fn participant(
    user_id: &str,
    name: &str,
    avatar: &str,
    status: ParticipantStatus,
    score: u32,
    completion_time: Option<u32>,
) -> ChallengeParticipant {
    ChallengeParticipant {
        user_id: user_id.to_string(),
        name: name.to_string(),
        avatar: avatar.to_string(),
        status,
        score,
        completion_time,
    }
}

fn seed_challenges(now: DateTime<Utc>) -> Vec<Challenge> {
    use ParticipantStatus::*;

    vec![
        Challenge {
            id: "challenge1".to_string(),
            title: "Array Master Challenge".to_string(),
            description: "Solve array-based problems in a competitive environment".to_string(),
            difficulty: Difficulty::Medium,
            participants: vec![
                participant("user1", "CodeMaster", "👨‍💻", Ready, 0, None),
                participant("user2", "AlgoQueen", "👩‍💻", Ready, 0, None),
                participant("user3", "BinaryBeast", "🤖", Ready, 0, None),
            ],
            max_participants: 4,
            start_time: now + Duration::minutes(5),
            duration: 30,
            status: ChallengeStatus::Waiting,
            xp_reward: 500,
            question_id: 3,
        },
        Challenge {
            id: "challenge2".to_string(),
            title: "Speed Coding Battle".to_string(),
            description: "Fastest solution wins!".to_string(),
            difficulty: Difficulty::Easy,
            participants: vec![
                participant("user4", "ArrayAce", "👨‍🎓", Solving, 75, None),
                participant("user5", "StackStar", "👩‍🎓", Solving, 60, None),
            ],
            max_participants: 3,
            start_time: now,
            duration: 15,
            status: ChallengeStatus::Active,
            xp_reward: 300,
            question_id: 1,
        },
        Challenge {
            id: "challenge3".to_string(),
            title: "Expert Level Showdown".to_string(),
            description: "For advanced coders only".to_string(),
            difficulty: Difficulty::Hard,
            participants: vec![
                participant("user1", "CodeMaster", "👨‍💻", Completed, 100, Some(1200)),
                participant("user2", "AlgoQueen", "👩‍💻", Completed, 95, Some(1350)),
            ],
            max_participants: 2,
            start_time: now - Duration::hours(1),
            duration: 45,
            status: ChallengeStatus::Completed,
            xp_reward: 800,
            question_id: 5,
        },
    ]
}

pub struct ChallengeBoard {
    store: Arc<dyn KeyValueStore>,
}

impl ChallengeBoard {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored challenges, or the seed list (saved) when nothing is stored yet
    fn load(&self) -> AppResult<Vec<Challenge>> {
        match self.store.get_item(CHALLENGES_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                let challenges = seed_challenges(Utc::now());
                self.save(&challenges)?;
                log::debug!("seeded {} challenges", challenges.len());
                Ok(challenges)
            }
        }
    }

    fn save(&self, challenges: &[Challenge]) -> AppResult<()> {
        let json = serde_json::to_string(challenges)?;
        self.store.set_item(CHALLENGES_KEY, &json)
    }

    /// Applies `change` to one challenge and writes the list back when it succeeds
    fn update<F>(&self, challenge_id: &str, change: F) -> AppResult<Challenge>
    where
        F: FnOnce(&mut Challenge) -> AppResult<()>,
    {
        let mut challenges = self.load()?;
        let challenge = challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
            .ok_or_else(|| AppError::ChallengeNotFound(challenge_id.to_string()))?;

        change(challenge)?;
        let updated = challenge.clone();

        self.save(&challenges)?;
        Ok(updated)
    }

    pub fn list(&self, status: Option<ChallengeStatus>) -> AppResult<Vec<Challenge>> {
        let mut challenges = self.load()?;
        challenges.retain(|c| status.map_or(true, |s| c.status == s));
        Ok(challenges)
    }

    /// Challenges the user takes part in
    pub fn joined_by(&self, user_id: &str) -> AppResult<Vec<Challenge>> {
        let mut challenges = self.load()?;
        challenges.retain(|c| c.participant(user_id).is_some());
        Ok(challenges)
    }

    pub fn get(&self, challenge_id: &str) -> AppResult<Challenge> {
        self.load()?
            .into_iter()
            .find(|c| c.id == challenge_id)
            .ok_or_else(|| AppError::ChallengeNotFound(challenge_id.to_string()))
    }

    pub fn join(&self, challenge_id: &str, user_id: &str) -> AppResult<Challenge> {
        let challenge = self.update(challenge_id, |challenge| {
            if challenge.status == ChallengeStatus::Completed {
                return Err(AppError::ChallengeClosed(challenge_id.to_string()));
            }
            if challenge.participant(user_id).is_some() {
                return Err(AppError::AlreadyJoined(challenge_id.to_string()));
            }
            if challenge.is_full() {
                return Err(AppError::ChallengeFull(challenge_id.to_string()));
            }

            challenge.participants.push(participant(
                user_id,
                JOINED_NAME,
                JOINED_AVATAR,
                ParticipantStatus::Ready,
                0,
                None,
            ));
            Ok(())
        })?;

        log::info!("user {} joined challenge {}", user_id, challenge_id);
        Ok(challenge)
    }

    pub fn leave(&self, challenge_id: &str, user_id: &str) -> AppResult<Challenge> {
        self.update(challenge_id, |challenge| {
            let before = challenge.participants.len();
            challenge.participants.retain(|p| p.user_id != user_id);
            if challenge.participants.len() == before {
                return Err(AppError::NotParticipant(challenge_id.to_string()));
            }
            Ok(())
        })
    }

    /// Fails unless the user is a participant who has not finished yet
    pub fn ensure_can_submit(&self, challenge_id: &str, user_id: &str) -> AppResult<Challenge> {
        let challenge = self.get(challenge_id)?;
        check_submission(&challenge, user_id)?;
        Ok(challenge)
    }

    /// Marks the participant completed. The challenge completes once every
    /// participant has.
    pub fn submit_score(
        &self,
        challenge_id: &str,
        user_id: &str,
        score: u32,
        completion_time: u32,
    ) -> AppResult<Challenge> {
        self.update(challenge_id, |challenge| {
            check_submission(challenge, user_id)?;

            if let Some(entry) = challenge
                .participants
                .iter_mut()
                .find(|p| p.user_id == user_id)
            {
                entry.status = ParticipantStatus::Completed;
                entry.score = score;
                entry.completion_time = Some(completion_time);
            }

            if challenge
                .participants
                .iter()
                .all(|p| p.status == ParticipantStatus::Completed)
            {
                challenge.status = ChallengeStatus::Completed;
            }
            Ok(())
        })
    }
}

fn check_submission(challenge: &Challenge, user_id: &str) -> AppResult<()> {
    let entry = challenge
        .participant(user_id)
        .ok_or_else(|| AppError::NotParticipant(challenge.id.clone()))?;

    if entry.status == ParticipantStatus::Completed {
        return Err(AppError::AlreadyFinished(challenge.id.clone()));
    }
    if challenge.status == ChallengeStatus::Completed {
        return Err(AppError::ChallengeClosed(challenge.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;

    fn board() -> ChallengeBoard {
        ChallengeBoard::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_seed_challenges() {
        let now = Utc::now();
        let seeded = seed_challenges(now);

        assert_eq!(seeded.len(), 3);
        assert_eq!(seeded[0].start_time, now + Duration::minutes(5));
        assert_eq!(seeded[0].question_id, 3);
        assert_eq!(seeded[2].status, ChallengeStatus::Completed);
    }

    #[test]
    fn test_seeded_on_first_read() {
        let store = Arc::new(MemoryStore::new());
        let board = ChallengeBoard::new(store.clone());
        assert!(store.get_item(CHALLENGES_KEY).unwrap().is_none());

        assert_eq!(board.list(None).unwrap().len(), 3);
        assert_eq!(board.list(Some(ChallengeStatus::Active)).unwrap()[0].id, "challenge2");
        assert!(store.get_item(CHALLENGES_KEY).unwrap().is_some());

        // start times stay put once stored
        let first = board.get("challenge1").unwrap();
        assert_eq!(board.get("challenge1").unwrap().start_time, first.start_time);
        assert!(matches!(
            board.get("challenge9"),
            Err(AppError::ChallengeNotFound(_))
        ));
    }

    #[test]
    fn test_join_rules() {
        let board = board();

        let joined = board.join("challenge1", "me").unwrap();
        assert_eq!(joined.participants.len(), 4);
        assert_eq!(joined.participant("me").unwrap().name, "You");

        assert!(matches!(
            board.join("challenge1", "me"),
            Err(AppError::AlreadyJoined(_))
        ));
        assert!(matches!(
            board.join("challenge1", "other"),
            Err(AppError::ChallengeFull(_))
        ));
        assert!(matches!(
            board.join("challenge3", "me"),
            Err(AppError::ChallengeClosed(_))
        ));
        assert_eq!(board.joined_by("me").unwrap().len(), 1);
    }

    #[test]
    fn test_board_shared_through_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        ChallengeBoard::new(store.clone()).join("challenge2", "me").unwrap();

        let other = ChallengeBoard::new(store);
        assert_eq!(other.get("challenge2").unwrap().participants.len(), 3);
        assert_eq!(other.leave("challenge2", "me").unwrap().participants.len(), 2);
    }

    #[test]
    fn test_leave() {
        let board = board();
        board.join("challenge2", "me").unwrap();

        assert_eq!(board.leave("challenge2", "me").unwrap().participants.len(), 2);
        assert!(matches!(
            board.leave("challenge2", "me"),
            Err(AppError::NotParticipant(_))
        ));
    }

    #[test]
    fn test_submit_score_completes_challenge() {
        let board = board();
        board.join("challenge2", "me").unwrap();

        let challenge = board.submit_score("challenge2", "me", 90, 600).unwrap();
        let me = challenge.participant("me").unwrap();
        assert_eq!(me.status, ParticipantStatus::Completed);
        assert_eq!(me.completion_time, Some(600));
        assert_eq!(challenge.status, ChallengeStatus::Active);

        board.submit_score("challenge2", "user4", 80, 700).unwrap();
        let challenge = board.submit_score("challenge2", "user5", 70, 800).unwrap();
        assert_eq!(challenge.status, ChallengeStatus::Completed);

        assert!(matches!(
            board.submit_score("challenge1", "me", 10, 10),
            Err(AppError::NotParticipant(_))
        ));
    }

    #[test]
    fn test_second_submission_rejected() {
        let board = board();
        board.join("challenge2", "me").unwrap();
        board.submit_score("challenge2", "me", 90, 600).unwrap();

        assert!(matches!(
            board.ensure_can_submit("challenge2", "me"),
            Err(AppError::AlreadyFinished(_))
        ));
        assert!(matches!(
            board.submit_score("challenge2", "me", 100, 10),
            Err(AppError::AlreadyFinished(_))
        ));

        let me = board.get("challenge2").unwrap();
        let me = me.participant("me").unwrap();
        assert_eq!(me.score, 90);
        assert_eq!(me.completion_time, Some(600));
    }
}
