use super::*;

#[derive(Debug, PartialEq)]
pub struct Submit {
    pub username: String,
    pub job_id: String,
    pub extranonce2: Extranonce,
    pub ntime: Ntime,
    pub nonce: Nonce,
}

impl Serialize for Submit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.username)?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.extranonce2)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.nonce)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Submit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (username, job_id, extranonce2, ntime, nonce) =
            <(String, String, Extranonce, Ntime, Nonce)>::deserialize(deserializer)?;

        Ok(Submit {
            username,
            job_id,
            extranonce2,
            ntime,
            nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_roundtrip() {
        let submit = Submit {
            username: "slush.miner1".into(),
            job_id: "bf".into(),
            extranonce2: "00000001".parse().unwrap(),
            ntime: "504e86ed".parse().unwrap(),
            nonce: "b2957c02".parse().unwrap(),
        };

        let json = serde_json::to_string(&submit).unwrap();
        assert_eq!(
            json,
            r#"["slush.miner1","bf","00000001","504e86ed","b2957c02"]"#
        );

        let back: Submit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, submit);
    }

    #[test]
    fn submit_reject_bad_arity() {
        assert!(serde_json::from_str::<Submit>(r#"["u","bf","00000001","504e86ed"]"#).is_err());
        assert!(
            serde_json::from_str::<Submit>(
                r#"["u","bf","00000001","504e86ed","b2957c02","extra"]"#
            )
            .is_err()
        );
    }
}
